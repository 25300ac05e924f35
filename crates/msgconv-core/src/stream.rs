//! Streaming reads of the converted artifact.

use std::io;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::CHUNK_SIZE;
use crate::error::Result;
use crate::workspace::Workspace;

pin_project_lite::pin_project! {
    /// A chunked byte stream over the converted artifact that owns its
    /// [`Workspace`].
    ///
    /// The workspace (and with it the artifact file) must stay intact
    /// until the response body has been fully written. Tying ownership to
    /// the stream makes teardown happen exactly when the body completes,
    /// and just as reliably when the client disconnects mid-stream and
    /// the body is dropped early.
    pub struct ArtifactStream {
        #[pin]
        inner: ReaderStream<File>,
        workspace: Workspace,
    }
}

impl ArtifactStream {
    /// Opens the artifact at `path` for streaming, taking ownership of
    /// the workspace that contains it.
    ///
    /// Reads are performed in [`CHUNK_SIZE`] chunks; the artifact is
    /// never loaded into memory at once. If the artifact cannot be
    /// opened the workspace is dropped (and removed) here.
    pub async fn open(workspace: Workspace, path: &Path) -> Result<Self> {
        let file = File::open(path).await?;

        Ok(Self {
            inner: ReaderStream::with_capacity(file, CHUNK_SIZE),
            workspace,
        })
    }

    /// Returns the workspace backing this stream.
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }
}

impl Stream for ArtifactStream {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.project().inner.poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;

    #[tokio::test]
    async fn streams_artifact_and_tears_down_workspace() -> Result<()> {
        let workspace = Workspace::create()?;
        let dir = workspace.path().to_path_buf();

        let artifact = workspace.path().join("mail.msg.eml");
        let payload = vec![0x42u8; CHUNK_SIZE * 2 + 17];
        std::fs::write(&artifact, &payload).unwrap();

        let mut stream = ArtifactStream::open(workspace, &artifact).await?;

        let mut collected = Vec::new();
        while let Some(chunk) = stream.next().await {
            collected.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(collected, payload);

        assert!(dir.exists());
        drop(stream);
        assert!(!dir.exists());
        Ok(())
    }

    #[tokio::test]
    async fn dropping_mid_stream_tears_down_workspace() -> Result<()> {
        let workspace = Workspace::create()?;
        let dir = workspace.path().to_path_buf();

        let artifact = workspace.path().join("mail.msg.eml");
        std::fs::write(&artifact, vec![0u8; CHUNK_SIZE * 4]).unwrap();

        let mut stream = ArtifactStream::open(workspace, &artifact).await?;
        let first = stream.next().await;
        assert!(first.is_some());

        // Client disconnect: the body stream is dropped before the end.
        drop(stream);
        assert!(!dir.exists());
        Ok(())
    }

    #[tokio::test]
    async fn missing_artifact_still_tears_down_workspace() -> Result<()> {
        let workspace = Workspace::create()?;
        let dir = workspace.path().to_path_buf();
        let artifact = workspace.path().join("absent.eml");

        let result = ArtifactStream::open(workspace, &artifact).await;
        assert!(result.is_err());
        assert!(!dir.exists());
        Ok(())
    }
}
