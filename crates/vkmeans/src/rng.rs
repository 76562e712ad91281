use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

// pi * 100_000
pub const DEFAULT_SEED: u64 = 314159;

pub fn new() -> Xoshiro256PlusPlus {
    from_seed(DEFAULT_SEED)
}

pub fn from_seed(seed: u64) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(seed)
}
