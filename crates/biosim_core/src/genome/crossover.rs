use biosim_data::Genome;
use rand::Rng;

/// Single-point crossover over the concatenated bit string.
///
/// The cut point is drawn from `[1, total_bits - 1]`: the child takes bits
/// `[0, point)` from `a` and `[point, total_bits)` from `b`.
pub fn crossover_with_rng<R: Rng>(a: &Genome, b: &Genome, rng: &mut R) -> Genome {
    debug_assert_eq!(a.len(), b.len());
    debug_assert_eq!(a.gene_bits, b.gene_bits);
    let total = a.len() * usize::from(a.gene_bits);
    if total < 2 {
        return a.clone();
    }
    let point = rng.gen_range(1..total);
    splice(a, b, point)
}

/// Joins the prefix `[0, point)` of `a` with the suffix of `b`.
#[must_use]
pub fn splice(a: &Genome, b: &Genome, point: usize) -> Genome {
    let gb = usize::from(a.gene_bits);
    let tokens = a
        .tokens
        .iter()
        .zip(&b.tokens)
        .enumerate()
        .map(|(i, (&ta, &tb))| {
            let start = i * gb;
            if start + gb <= point {
                ta
            } else if start >= point {
                tb
            } else {
                // Cut falls inside this gene: the top `point - start` bits come from `a`.
                let low_bits = gb - (point - start);
                let low_mask = (1u32 << low_bits) - 1;
                (ta & !low_mask) | (tb & low_mask)
            }
        })
        .collect();
    Genome::new(tokens, a.gene_bits)
}

/// Flips each bit independently with probability `rate`. Returns the number
/// of bits flipped.
pub fn mutate_with_rng<R: Rng>(genome: &mut Genome, rate: f64, rng: &mut R) -> usize {
    if rate <= 0.0 {
        return 0;
    }
    let rate = rate.min(1.0);
    let gb = genome.gene_bits;
    let mut flips = 0;
    for token in &mut genome.tokens {
        for bit in 0..gb {
            if rng.gen_bool(rate) {
                *token ^= 1 << bit;
                flips += 1;
            }
        }
    }
    flips
}

/// Crossover followed by mutation.
pub fn breed_with_rng<R: Rng>(a: &Genome, b: &Genome, rate: f64, rng: &mut R) -> Genome {
    let mut child = crossover_with_rng(a, b, rng);
    mutate_with_rng(&mut child, rate, rng);
    child
}
