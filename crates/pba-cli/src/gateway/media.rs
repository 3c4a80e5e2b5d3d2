use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures_util::StreamExt;
use pba_core::{ExtractedProfile, UserProfile};
use tokio::io::AsyncWriteExt;

use super::prompts;
use super::wire::{
    Content, ExtractedOut, GenerateRequest, GenerationConfig, ImageConfig, Operation, Part,
    PredictRequest, VideoInstance, VideoParameters, response_schema,
};
use super::{Gateway, GatewayError, Result, or_fallback};

impl Gateway {
    /// 1:1 asset portrait as a `data:` URI.
    pub async fn portrait(&self, _profile: &UserProfile) -> Option<String> {
        let result = self.portrait_inner().await;
        or_fallback("portrait", result.map(Some), || None)
    }

    async fn portrait_inner(&self) -> Result<String> {
        let request = GenerateRequest::prompt(prompts::PORTRAIT).config(GenerationConfig {
            image_config: Some(ImageConfig {
                aspect_ratio: "1:1".to_string(),
            }),
            ..GenerationConfig::default()
        });
        let response = self.generate(&self.models.image, &request).await?;
        let inline = response.inline_data().ok_or(GatewayError::Empty)?;
        let mime = if inline.mime_type.is_empty() {
            "image/png"
        } else {
            &inline.mime_type
        };
        Ok(format!("data:{mime};base64,{}", inline.data))
    }

    /// Render the asset reel, wait for the long-running operation, and save
    /// it under the media directory. Returns the file path.
    pub async fn video(&self, profile: &UserProfile) -> Option<PathBuf> {
        let result = self.video_inner(profile).await;
        or_fallback("video", result.map(Some), || None)
    }

    async fn video_inner(&self, profile: &UserProfile) -> Result<PathBuf> {
        let request = PredictRequest {
            instances: vec![VideoInstance {
                prompt: prompts::VIDEO.to_string(),
            }],
            parameters: VideoParameters {
                aspect_ratio: "16:9".to_string(),
                resolution: "720p".to_string(),
                sample_count: 1,
            },
        };
        let mut operation: Operation = self
            .post_json(
                &self.model_url(&self.models.video, "predictLongRunning"),
                &request,
            )
            .await?;
        tracing::info!("video operation started: {}", operation.name);

        while !operation.done {
            tokio::time::sleep(self.video_poll_interval).await;
            let url = format!("{}/v1beta/{}", self.api_base, operation.name);
            operation = self.get_json(&url).await?;
            tracing::debug!("video operation {} done={}", operation.name, operation.done);
        }

        if let Some(err) = &operation.error {
            return Err(GatewayError::Operation(format!("{} ({})", err.message, err.code)));
        }
        let uri = operation.video_uri().ok_or(GatewayError::Empty)?;
        self.download(uri, &format!("{}.mp4", profile.id)).await
    }

    async fn download(&self, uri: &str, file_name: &str) -> Result<PathBuf> {
        let response = self
            .http
            .get(uri)
            .header("x-goog-api-key", self.key()?)
            .send()
            .await?;
        let response = Self::checked(response).await?;

        tokio::fs::create_dir_all(&self.media_dir).await?;
        let path = self.media_dir.join(file_name);
        if let Err(e) = write_body(response, &path).await {
            if let Err(rm) = tokio::fs::remove_file(&path).await {
                tracing::warn!("failed to remove partial {}: {rm}", path.display());
            }
            return Err(e);
        }
        tracing::info!("saved video to {}", path.display());
        Ok(path)
    }

    /// OCR a birth certificate or ID document into intake fields.
    pub async fn extract_profile(&self, bytes: &[u8], mime_type: &str) -> Option<ExtractedProfile> {
        let result = self.extract_inner(bytes, mime_type).await;
        or_fallback("document scan", result.map(Some), || None)
    }

    async fn extract_inner(&self, bytes: &[u8], mime_type: &str) -> Result<ExtractedProfile> {
        let request = GenerateRequest {
            contents: vec![Content::user(vec![
                Part::inline(mime_type, STANDARD.encode(bytes)),
                Part::text(prompts::OCR),
            ])],
            ..GenerateRequest::default()
        }
        .config(GenerationConfig::json(response_schema::<ExtractedOut>()));

        let out: ExtractedOut = self
            .generate_structured(&self.models.flash, &request)
            .await?;
        Ok(ExtractedProfile {
            full_name: out.full_name,
            dob: out.dob,
            birth_time: out.birth_time,
            birth_location: out.birth_location,
        })
    }

    /// Speak `text` in the Handler voice. Returns raw PCM.
    pub async fn text_to_speech(&self, text: &str) -> Option<Vec<u8>> {
        let result = self.speech_inner(text).await;
        or_fallback("text to speech", result.map(Some), || None)
    }

    async fn speech_inner(&self, text: &str) -> Result<Vec<u8>> {
        let request = GenerateRequest::prompt(prompts::speech(text))
            .config(GenerationConfig::audio(&self.voice));
        let response = self.generate(&self.models.tts, &request).await?;
        let inline = response.inline_data().ok_or(GatewayError::Empty)?;
        Ok(STANDARD.decode(inline.data.as_bytes())?)
    }
}

async fn write_body(response: reqwest::Response, path: &Path) -> Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::{gateway, text_body};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn profile() -> UserProfile {
        UserProfile {
            id: "PBA-ASSET-VID000001".into(),
            full_name: "Ada Lovelace".into(),
            dob: "1815-12-10".into(),
            birth_time: String::new(),
            birth_location: String::new(),
            life_path_number: None,
            archetype: None,
            is_premium: None,
            avatar_url: None,
        }
    }

    fn inline_body(mime: &str, data: &str) -> serde_json::Value {
        json!({
            "candidates": [{"content": {"parts": [
                {"text": "here you go"},
                {"inlineData": {"mimeType": mime, "data": data}}
            ]}}]
        })
    }

    #[tokio::test]
    async fn test_portrait_data_uri() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash-image:generateContent"))
            .and(body_partial_json(json!({"generationConfig": {"imageConfig": {"aspectRatio": "1:1"}}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(inline_body("image/jpeg", "AAAA")))
            .mount(&server)
            .await;
        let dir = tempfile::TempDir::new().unwrap();
        let uri = gateway(&server.uri(), dir.path()).portrait(&profile()).await;
        assert_eq!(uri.as_deref(), Some("data:image/jpeg;base64,AAAA"));
    }

    #[tokio::test]
    async fn test_portrait_without_image_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_body("no image")))
            .mount(&server)
            .await;
        let dir = tempfile::TempDir::new().unwrap();
        assert!(gateway(&server.uri(), dir.path()).portrait(&profile()).await.is_none());
    }

    #[tokio::test]
    async fn test_video_polls_then_downloads() {
        let server = MockServer::start().await;
        let op = "models/veo-3.1-fast-generate-preview/operations/op1";
        Mock::given(method("POST"))
            .and(path("/v1beta/models/veo-3.1-fast-generate-preview:predictLongRunning"))
            .and(body_partial_json(json!({"parameters": {"aspectRatio": "16:9", "resolution": "720p"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": op})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/v1beta/{op}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": op,
                "done": true,
                "response": {"generateVideoResponse": {"generatedSamples": [
                    {"video": {"uri": format!("{}/files/reel.mp4", server.uri())}}
                ]}}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/files/reel.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"MP4DATA".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        let saved = gateway(&server.uri(), dir.path()).video(&profile()).await.unwrap();
        assert_eq!(saved, dir.path().join("media").join("PBA-ASSET-VID000001.mp4"));
        assert_eq!(std::fs::read(&saved).unwrap(), b"MP4DATA");
    }

    /// Serves one response that promises more body than it sends.
    async fn truncated_file_server() -> String {
        use tokio::io::AsyncReadExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut tcp, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = tcp.read(&mut buf).await;
            tcp.write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 4096\r\n\r\nMP4")
                .await
                .unwrap();
            tcp.flush().await.unwrap();
        });
        format!("http://{addr}/files/reel.mp4")
    }

    #[tokio::test]
    async fn test_video_truncated_download_leaves_no_file() {
        let server = MockServer::start().await;
        let file_uri = truncated_file_server().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "models/v/operations/cut",
                "done": true,
                "response": {"generateVideoResponse": {"generatedSamples": [
                    {"video": {"uri": file_uri}}
                ]}}
            })))
            .mount(&server)
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        assert!(gateway(&server.uri(), dir.path()).video(&profile()).await.is_none());
        assert!(dir.path().join("media").is_dir());
        assert!(!dir.path().join("media").join("PBA-ASSET-VID000001.mp4").exists());
    }

    #[tokio::test]
    async fn test_video_operation_error_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "models/v/operations/x",
                "done": true,
                "error": {"code": 3, "message": "prompt rejected"}
            })))
            .mount(&server)
            .await;
        let dir = tempfile::TempDir::new().unwrap();
        assert!(gateway(&server.uri(), dir.path()).video(&profile()).await.is_none());
    }

    #[tokio::test]
    async fn test_extract_profile() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"contents": [{"parts": [
                {"inlineData": {"mimeType": "image/png", "data": "AQID"}}
            ]}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_body(
                r#"{"fullName": "Grace Hopper", "dob": "1906-12-09", "birthTime": null}"#,
            )))
            .mount(&server)
            .await;
        let dir = tempfile::TempDir::new().unwrap();
        let extracted = gateway(&server.uri(), dir.path())
            .extract_profile(&[1, 2, 3], "image/png")
            .await
            .unwrap();
        assert_eq!(extracted.full_name.as_deref(), Some("Grace Hopper"));
        assert_eq!(extracted.dob.as_deref(), Some("1906-12-09"));
        assert!(extracted.birth_time.is_none());
        assert!(extracted.birth_location.is_none());
    }

    #[tokio::test]
    async fn test_text_to_speech_decodes_pcm() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash-preview-tts:generateContent"))
            .and(body_partial_json(json!({"generationConfig": {"responseModalities": ["AUDIO"]}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(inline_body("audio/pcm", "AQID")))
            .mount(&server)
            .await;
        let dir = tempfile::TempDir::new().unwrap();
        let pcm = gateway(&server.uri(), dir.path()).text_to_speech("hello").await;
        assert_eq!(pcm, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_text_to_speech_bad_base64_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(inline_body("audio/pcm", "!!!")))
            .mount(&server)
            .await;
        let dir = tempfile::TempDir::new().unwrap();
        assert!(gateway(&server.uri(), dir.path()).text_to_speech("hello").await.is_none());
    }
}
