//! The four-stage request pipeline: extract, rewrite, normalize, render.
//!
//! Each request runs the stages as one sequence; a stage failure skips the
//! rest and surfaces as a typed `AppError`. The upload and the rendered
//! output each live in a `NamedTempFile` guard owned by `run`, so both are
//! deleted on every exit path. The rewrite call is the only stage with
//! materially variable latency and the only one wrapped in a hard timeout.

use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;
use crate::extract;
use crate::models::resume::{normalize, CanonicalResume};
use crate::render::{self, RenderError};
use crate::rewrite::{GenerationError, Rewrite};

/// Upper bound on one rewrite call, including retries inside the client.
const REWRITE_TIMEOUT: Duration = Duration::from_secs(120);

/// Per-request document pipeline. The rewriter is an injected dependency so
/// tests can run the full pipeline against a fake.
pub struct Pipeline {
    rewriter: Arc<dyn Rewrite>,
    rewrite_timeout: Duration,
}

impl Pipeline {
    pub fn new(rewriter: Arc<dyn Rewrite>) -> Self {
        Self {
            rewriter,
            rewrite_timeout: REWRITE_TIMEOUT,
        }
    }

    #[cfg(test)]
    fn with_timeout(rewriter: Arc<dyn Rewrite>, rewrite_timeout: Duration) -> Self {
        Self {
            rewriter,
            rewrite_timeout,
        }
    }

    /// Runs one upload through all four stages and returns the rendered
    /// document bytes.
    pub async fn run(&self, upload: Bytes) -> Result<Bytes, AppError> {
        // Stage temp storage: both guards delete their file on drop,
        // whichever way this function exits.
        let upload_file = spool(&upload).map_err(|e| AppError::Internal(e.into()))?;

        let path = upload_file.path().to_path_buf();
        let text = tokio::task::spawn_blocking(move || extract::extract_text(&path))
            .await
            .context("extraction task panicked")??;

        let raw = tokio::time::timeout(self.rewrite_timeout, self.rewriter.rewrite(&text))
            .await
            .map_err(|_| GenerationError::Timeout)??;

        let record = normalize(raw);
        info!(
            "Normalized resume: {} experience entries, {} skills",
            record.experience.len(),
            record.skills.len()
        );

        let rendered = render_to_spool(record).await?;
        Ok(rendered)
    }
}

/// Renders off the async runtime and materializes the output through a
/// temp-file sink, mirroring the upload spool's lifecycle.
async fn render_to_spool(record: CanonicalResume) -> Result<Bytes, AppError> {
    let rendered = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, RenderError> {
        let bytes = render::render(&record);
        let mut output_file = tempfile::NamedTempFile::new().map_err(RenderError::Io)?;
        output_file.write_all(&bytes).map_err(RenderError::Io)?;
        output_file.flush().map_err(RenderError::Io)?;

        let mut delivered = Vec::with_capacity(bytes.len());
        output_file
            .reopen()
            .map_err(RenderError::Io)?
            .read_to_end(&mut delivered)
            .map_err(RenderError::Io)?;
        Ok(delivered)
    })
    .await
    .context("render task panicked")??;

    Ok(Bytes::from(rendered))
}

fn spool(bytes: &Bytes) -> std::io::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::extract::ExtractError;
    use crate::models::resume::RawResume;
    use crate::rewrite::parse_payload;

    /// Fake rewriter returning a canned payload and counting invocations.
    struct FakeRewriter {
        payload: String,
        calls: AtomicUsize,
    }

    impl FakeRewriter {
        fn new(payload: &str) -> Arc<Self> {
            Arc::new(Self {
                payload: payload.to_string(),
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Rewrite for FakeRewriter {
        async fn rewrite(&self, _resume_text: &str) -> Result<RawResume, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            parse_payload(&self.payload)
        }
    }

    struct SlowRewriter;

    #[async_trait]
    impl Rewrite for SlowRewriter {
        async fn rewrite(&self, _resume_text: &str) -> Result<RawResume, GenerationError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(RawResume::default())
        }
    }

    /// A readable source PDF: rendered by our own renderer so its extracted
    /// text clears the 50-character floor.
    fn source_pdf() -> Bytes {
        let record = CanonicalResume {
            name: "Ada Lovelace".to_string(),
            summary: Some(
                "Managed a team and increased sales by 20% while modernizing reporting."
                    .to_string(),
            ),
            ..CanonicalResume::default()
        };
        Bytes::from(render::render(&record))
    }

    const REWRITTEN: &str = r#"{
        "name": "Ada Lovelace",
        "summary": "Results-driven leader.",
        "experience": [{
            "position": "Sales Manager",
            "company": "Acme Corp",
            "startDate": "2019",
            "bullets": ["Increased sales by 20% year over year"]
        }],
        "skills": ["Leadership"]
    }"#;

    #[tokio::test]
    async fn test_end_to_end_quantified_bullet_reaches_output() {
        let rewriter = FakeRewriter::new(REWRITTEN);
        let pipeline = Pipeline::new(rewriter.clone());

        let output = pipeline.run(source_pdf()).await.unwrap();
        assert_eq!(rewriter.call_count(), 1);

        let text = pdf_extract::extract_text_from_mem(&output).unwrap();
        assert!(text.contains("CAREER HISTORY"));
        assert!(text.contains("20%"));
        assert!(text.contains("Present"), "missing endDate default");
    }

    #[tokio::test]
    async fn test_short_text_aborts_before_rewrite() {
        let rewriter = FakeRewriter::new(REWRITTEN);
        let pipeline = Pipeline::new(rewriter.clone());

        let record = CanonicalResume {
            name: "Hi".to_string(),
            ..CanonicalResume::default()
        };
        let tiny = Bytes::from(render::render(&record));

        let err = pipeline.run(tiny).await.unwrap_err();
        assert!(matches!(err, AppError::Extract(ExtractError::Unreadable)));
        assert_eq!(rewriter.call_count(), 0, "rewriter must not be invoked");
    }

    #[tokio::test]
    async fn test_garbage_upload_is_unreadable() {
        let rewriter = FakeRewriter::new(REWRITTEN);
        let pipeline = Pipeline::new(rewriter.clone());

        let err = pipeline
            .run(Bytes::from_static(b"not a pdf at all"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Extract(ExtractError::Unreadable)));
        assert_eq!(rewriter.call_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_rewrite_response_skips_rendering() {
        let rewriter = FakeRewriter::new("{\"name\": \"Ada\", \"skills\": [\"Ru");
        let pipeline = Pipeline::new(rewriter.clone());

        let err = pipeline.run(source_pdf()).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Generation(GenerationError::Malformed(_))
        ));
        assert_eq!(rewriter.call_count(), 1);
    }

    #[tokio::test]
    async fn test_slow_rewrite_surfaces_timeout() {
        let pipeline =
            Pipeline::with_timeout(Arc::new(SlowRewriter), Duration::from_millis(50));

        let err = pipeline.run(source_pdf()).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Generation(GenerationError::Timeout)
        ));
    }

    #[tokio::test]
    async fn test_fenced_rewrite_response_parses() {
        let fenced = format!("```json\n{REWRITTEN}\n```");
        let rewriter = FakeRewriter::new(&fenced);
        let pipeline = Pipeline::new(rewriter);

        let output = pipeline.run(source_pdf()).await.unwrap();
        let text = pdf_extract::extract_text_from_mem(&output).unwrap();
        assert!(text.contains("Sales Manager"));
    }
}
