pub mod primes;
pub mod sampling;
pub mod utils;

pub use primes::{
    generate_modulus_chain, get_first_prime_down, is_ntt_friendly_prime, is_prime,
};
pub use sampling::{
    gaussian_coefficients, ternary_coefficients, uniform_coefficients,
};
pub use utils::{
    add_mod, center, mod_inverse, mod_pow, mul_mod, reduce_signed, sub_mod,
};
