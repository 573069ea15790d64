/// Asserts that the grid and the organism arena reference each other exactly.
#[macro_export]
macro_rules! assert_in_sync {
    ($state:expr) => {
        assert_eq!(
            $state.grid.population(),
            $state.organisms.len(),
            "Grid population differs from arena size"
        );
        for (i, o) in $state.organisms.iter().enumerate() {
            assert_eq!(o.id.0, i, "Organism id does not match its index");
            assert_eq!(
                $state.grid.organism_at(o.position),
                Some(o.id),
                "Cell {:?} does not reference organism {}",
                o.position,
                i
            );
        }
    };
}

/// Asserts that the organism with the given index stands on `(x, y)`.
#[macro_export]
macro_rules! assert_organism_at {
    ($state:expr, $index:expr, $x:expr, $y:expr) => {
        let o = &$state.organisms[$index];
        assert_eq!(
            (o.position.x, o.position.y),
            ($x, $y),
            "Organism {} is not at the expected cell",
            $index
        );
    };
}

/// Asserts that the arena holds the expected number of organisms.
#[macro_export]
macro_rules! assert_population {
    ($state:expr, $count:expr) => {
        assert_eq!($state.organisms.len(), $count, "Population count mismatch");
    };
}
