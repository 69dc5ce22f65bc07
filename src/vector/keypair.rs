use super::{PrivateKey, PublicKey};
use crate::{
    crypto::{CkksParams, Context},
    errors::HeResult,
};
use rand::Rng;
use tracing::{info, instrument};

/// Entry point for creating a matching [`PublicKey`] / [`PrivateKey`] pair.
pub struct KeyPairGenerator;

impl KeyPairGenerator {
    /// Generates a key pair from `params`, or from [`CkksParams::default`]
    /// (degree 8192, chain `[60, 40, 40, 60]`, scale `2^40`) when `None`.
    ///
    /// Rejected parameter combinations are reported as
    /// [`HeError::Configuration`](crate::HeError::Configuration).
    pub fn generate(params: Option<CkksParams>) -> HeResult<(PublicKey, PrivateKey)> {
        Self::generate_with_rng(params, &mut rand::rng())
    }

    #[instrument(skip_all)]
    pub fn generate_with_rng<R: Rng>(
        params: Option<CkksParams>,
        rng: &mut R,
    ) -> HeResult<(PublicKey, PrivateKey)> {
        let params = params.unwrap_or_default();
        let context = Context::generate(params, rng)?;
        let private_key = PrivateKey::new(context.to_secret());
        let public_key = PublicKey::new(context.make_public());
        info!(
            degree = public_key.context().scheme().degree(),
            levels = public_key.context().scheme().top_level() + 1,
            "generated CKKS key pair"
        );
        Ok((public_key, private_key))
    }
}
