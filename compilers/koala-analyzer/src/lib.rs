pub mod error;
pub mod tagged;

use std::sync::Arc;

use async_trait::async_trait;
use koala_model::Sentence;
use koala_protocol::NativeSentence;
use tracing::debug;

pub use error::AnalyzerError;
pub use tagged::{parse_tagged, TaggedTextAnalyzer};

/// The black-box analyzer seam: text in, wire-form sentences out.
pub trait NativeAnalyzer: Send + Sync {
    fn analyze_native(&self, text: &str) -> Result<Vec<NativeSentence>, AnalyzerError>;

    /// Runs the analyzer's stages over an already tagged sentence. Analyzers
    /// without extra stages hand the sentence back unchanged.
    fn annotate_native(&self, sentence: NativeSentence) -> Result<NativeSentence, AnalyzerError> {
        Ok(sentence)
    }
}

/// Blocking and awaitable analysis. Both must yield value-identical graphs for
/// the same input.
#[async_trait(?Send)]
pub trait Analyze {
    fn analyze(&self, text: &str) -> Result<Vec<Sentence>, AnalyzerError>;

    async fn analyze_async(&self, text: &str) -> Result<Vec<Sentence>, AnalyzerError>;
}

/// Rebuilds every sentence; the first failure aborts the batch.
pub fn reconstruct_all(native: &[NativeSentence]) -> Result<Vec<Sentence>, AnalyzerError> {
    native
        .iter()
        .map(|sentence| Sentence::from_native(sentence).map_err(AnalyzerError::from))
        .collect()
}

/// Connects a [`NativeAnalyzer`] to the annotation model.
pub struct Pipeline<A> {
    analyzer: Arc<A>,
}

impl<A: NativeAnalyzer + 'static> Pipeline<A> {
    pub fn new(analyzer: A) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
        }
    }

    /// Re-analyzes a sentence built elsewhere and returns a fresh graph; the
    /// input sentence is left untouched.
    pub fn annotate(&self, sentence: &Sentence) -> Result<Sentence, AnalyzerError> {
        let native = self.analyzer.annotate_native(sentence.to_native()?)?;
        Ok(Sentence::from_native(&native)?)
    }
}

impl<A> Clone for Pipeline<A> {
    fn clone(&self) -> Self {
        Self {
            analyzer: Arc::clone(&self.analyzer),
        }
    }
}

#[async_trait(?Send)]
impl<A: NativeAnalyzer + 'static> Analyze for Pipeline<A> {
    fn analyze(&self, text: &str) -> Result<Vec<Sentence>, AnalyzerError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let native = self.analyzer.analyze_native(text)?;
        debug!(sentences = native.len(), "analysis finished");
        reconstruct_all(&native)
    }

    async fn analyze_async(&self, text: &str) -> Result<Vec<Sentence>, AnalyzerError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        // Only the wire form crosses threads; the graph is built on the caller's side.
        let analyzer = Arc::clone(&self.analyzer);
        let text = text.to_string();
        let native = tokio::task::spawn_blocking(move || analyzer.analyze_native(&text)).await??;
        debug!(sentences = native.len(), "background analysis finished");
        reconstruct_all(&native)
    }
}
