//! Shared providers and catalogs for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use semsearch::{CatalogRecord, EmbeddingProvider, Item, SemanticError, TokenOutputs};

/// Width of the lexicon's concept space.
pub const LEXICON_DIM: usize = 5;

/// Maps known words onto concept axes (footwear, furniture, lighting,
/// colour, kitchen). Unknown words contribute a zero token, so a text made
/// only of unknown words pools to a degenerate vector.
pub struct LexiconProvider {
    calls: AtomicUsize,
    down: AtomicBool,
    delay: Option<Duration>,
}

impl LexiconProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            down: AtomicBool::new(false),
            delay: None,
        })
    }

    /// Every call sleeps for `delay` first.
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            down: AtomicBool::new(false),
            delay: Some(delay),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn word_vector(word: &str) -> [f32; LEXICON_DIM] {
        match word {
            "sneakers" | "shoes" | "running" | "trainers" | "boots" | "footwear" => {
                [1.0, 0.0, 0.0, 0.0, 0.0]
            }
            "chair" | "office" | "desk" | "sofa" | "table" | "furniture" => {
                [0.0, 1.0, 0.0, 0.0, 0.0]
            }
            "lamp" | "light" | "bulb" => [0.0, 0.0, 1.0, 0.0, 0.0],
            "red" | "blue" | "green" | "black" => [0.0, 0.0, 0.0, 0.4, 0.0],
            "kettle" | "pan" | "knife" | "kitchen" => [0.0, 0.0, 0.0, 0.0, 1.0],
            _ => [0.0; LEXICON_DIM],
        }
    }
}

#[async_trait]
impl EmbeddingProvider for LexiconProvider {
    fn name(&self) -> &str {
        "lexicon"
    }

    async fn embed_raw(&self, text: &str) -> Result<TokenOutputs, SemanticError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.down.load(Ordering::SeqCst) {
            return Err(SemanticError::provider("lexicon", "inference backend offline"));
        }
        let tokens = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(|w| Self::word_vector(&w.to_lowercase()).to_vec())
            .collect();
        TokenOutputs::from_tokens(tokens, LEXICON_DIM)
    }
}

pub fn record(id: &str, name: &str) -> CatalogRecord {
    Item::new(id, name).into()
}

/// The two-item catalog from the product walkthrough.
pub fn shoes_and_chair() -> Vec<CatalogRecord> {
    vec![
        record("a", "red running shoes"),
        record("b", "blue office chair"),
    ]
}

/// A mixed catalog with descriptions, categories, and tags.
pub fn storefront() -> Vec<CatalogRecord> {
    vec![
        Item::new("sku-1", "Trail Runner")
            .with_description("lightweight running shoes")
            .with_category("footwear")
            .with_tags(["outdoor", "sport"])
            .into(),
        Item::new("sku-2", "Ergo Seat")
            .with_description("adjustable office chair")
            .with_category("furniture")
            .into(),
        Item::new("sku-3", "Brass Lamp")
            .with_description("warm desk light")
            .with_tags(["lighting"])
            .into(),
        Item::new("sku-4", "Chef Kettle")
            .with_category("kitchen")
            .into(),
        Item::new("sku-5", "Hiking Boots")
            .with_description("waterproof boots")
            .with_category("footwear")
            .into(),
    ]
}
