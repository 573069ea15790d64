use biosim_lib::model::{BarrierRect, Cell, OrganismId, Position, WorldGrid};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

prop_compose! {
    fn arb_world()(
        width in 2u16..24,
        height in 2u16..24,
        barrier in prop::option::of((0i32..24, 0i32..24, 0i32..6, 0i32..6)),
        population in 1usize..30,
        seed in any::<u64>(),
    ) -> (WorldGrid, Vec<Position>) {
        let barriers: Vec<BarrierRect> = barrier
            .map(|(x0, y0, w, h)| BarrierRect { x0, y0, x1: x0 + w, y1: y0 + h })
            .into_iter()
            .collect();
        let mut grid = WorldGrid::with_barriers(width, height, &barriers);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut positions = Vec::new();
        for i in 0..population.min(grid.empty_count()) {
            let pos = grid.random_empty_cell(&mut rng).expect("empty cells remain");
            grid.place(OrganismId(i), pos).expect("cell was empty");
            positions.push(pos);
        }
        (grid, positions)
    }
}

fn step_strategy() -> impl Strategy<Value = Vec<(usize, i32, i32)>> {
    prop::collection::vec((any::<usize>(), -1i32..=1, -1i32..=1), 1..80)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn move_accepted_iff_target_free((world, steps) in (arb_world(), step_strategy())) {
        let (mut grid, mut positions) = world;
        prop_assume!(!positions.is_empty());
        let barrier_count = grid.barrier_cells().count();

        for (pick, dx, dy) in steps {
            let i = pick % positions.len();
            let id = OrganismId(i);
            let before = positions[i];
            let target = before.offset(dx, dy);
            let expected = grid.get(target) == Some(Cell::Empty);

            let moved = grid
                .move_organism(id, &mut positions[i], dx, dy)
                .expect("grid and arena agree");

            prop_assert_eq!(moved, expected);
            if moved {
                prop_assert_eq!(positions[i], target);
                prop_assert_eq!(grid.get(before), Some(Cell::Empty));
            } else {
                prop_assert_eq!(positions[i], before);
            }
            prop_assert_eq!(grid.organism_at(positions[i]), Some(id));
        }

        prop_assert_eq!(grid.population(), positions.len());
        prop_assert_eq!(grid.barrier_cells().count(), barrier_count);
        for (i, &pos) in positions.iter().enumerate() {
            prop_assert!(grid.in_bounds(pos));
            prop_assert_eq!(grid.organism_at(pos), Some(OrganismId(i)));
        }
    }
}

#[test]
fn test_move_from_stale_position_is_rejected() {
    let mut grid = WorldGrid::new(4, 4);
    grid.place(OrganismId(0), Position::new(1, 1)).expect("empty");
    let mut wrong = Position::new(2, 2);
    assert!(grid.move_organism(OrganismId(0), &mut wrong, 1, 0).is_err());
    assert_eq!(wrong, Position::new(2, 2));
    assert_eq!(grid.organism_at(Position::new(1, 1)), Some(OrganismId(0)));
}

#[test]
fn test_corner_moves_respect_edges() {
    let mut grid = WorldGrid::new(3, 3);
    let mut pos = Position::new(0, 0);
    grid.place(OrganismId(0), pos).expect("empty");

    for (dx, dy) in [(-1, 0), (0, -1), (-1, -1)] {
        assert!(!grid.move_organism(OrganismId(0), &mut pos, dx, dy).expect("in sync"));
    }
    assert!(grid.move_organism(OrganismId(0), &mut pos, 1, 1).expect("in sync"));
    assert_eq!(pos, Position::new(1, 1));
}
