use async_trait::async_trait;
use fxhash::hash64;

use crate::provider::EmbeddingProvider;
use crate::{SemanticError, TokenOutputs};

/// Deterministic offline provider.
///
/// Each lowercase alphanumeric word becomes one "token" whose hidden state is
/// a pseudo-random vector seeded from the word's hash, so texts that share
/// words end up close after pooling. There is no real semantics here; it
/// exists for tests, demos, and deployments without model assets.
#[derive(Debug, Clone)]
pub struct StubProvider {
    dim: usize,
}

impl StubProvider {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    fn token_vector(&self, token: &str) -> Vec<f32> {
        let mut state = hash64(token.as_bytes());
        (0..self.dim)
            .map(|_| {
                state = splitmix64(state);
                // Top 24 bits mapped onto [-1, 1).
                ((state >> 40) as f32 / (1u64 << 23) as f32) - 1.0
            })
            .collect()
    }
}

fn splitmix64(state: u64) -> u64 {
    let mut z = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

pub(crate) fn stub_tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

#[async_trait]
impl EmbeddingProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn embed_raw(&self, text: &str) -> Result<TokenOutputs, SemanticError> {
        let tokens: Vec<Vec<f32>> = stub_tokens(text)
            .map(|token| self.token_vector(&token))
            .collect();
        TokenOutputs::from_tokens(tokens, self.dim)
    }
}
