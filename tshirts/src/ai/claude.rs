//! [`AiBackend`] backed by the `claude` command-line tool

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

use super::error::{AiError, AiResult};
use super::AiBackend;
use crate::config::AiSettings;

/// Runs `<command> -p --model <model> --output-format json --json-schema <schema>`
/// once per call, prompt on stdin
#[derive(Debug, Clone)]
pub struct ClaudeCli {
    command: String,
    model: String,
    timeout: Duration,
}

impl ClaudeCli {
    pub fn new(settings: &AiSettings) -> Self {
        Self {
            command: settings.command.clone(),
            model: settings.model.clone(),
            timeout: settings.timeout,
        }
    }

    fn args(&self, schema: &Value) -> Vec<String> {
        vec![
            "-p".to_string(),
            "--model".to_string(),
            self.model.clone(),
            "--output-format".to_string(),
            "json".to_string(),
            "--json-schema".to_string(),
            schema.to_string(),
        ]
    }

    async fn run(&self, prompt: &str, schema: &Value) -> AiResult<std::process::Output> {
        let mut child = Command::new(&self.command)
            .args(self.args(schema))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => AiError::NotFound(self.command.clone()),
                _ => AiError::Io(e),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // early exit closes the pipe; exit status and stderr are checked below
            match stdin.write_all(prompt.as_bytes()).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    debug!("AI process closed stdin before reading the whole prompt");
                }
                Err(e) => return Err(AiError::Io(e)),
            }
            // dropping closes the pipe so the process sees EOF
        }

        Ok(child.wait_with_output().await?)
    }
}

#[async_trait]
impl AiBackend for ClaudeCli {
    #[instrument(skip_all, fields(model = %self.model, prompt_len = prompt.len()))]
    async fn structured(&self, prompt: &str, schema: &Value) -> AiResult<Value> {
        let output = tokio::time::timeout(self.timeout, self.run(prompt, schema))
            .await
            .map_err(|_| AiError::Timeout(self.timeout.as_secs()))??;

        if !output.status.success() {
            return Err(AiError::CommandFailed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!(bytes = stdout.len(), "AI process finished");
        extract_payload(&stdout)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Pull the structured payload out of the CLI's JSON envelope
///
/// The CLI wraps results as `{"type": "result", "is_error": false,
/// "structured_output": {...}, ...}`. Output that is already the bare
/// payload object is accepted as is.
pub fn extract_payload(stdout: &str) -> AiResult<Value> {
    let value: Value = serde_json::from_str(stdout.trim())
        .map_err(|e| AiError::Malformed(format!("output is not JSON: {e}")))?;

    let Value::Object(mut envelope) = value else {
        return Err(AiError::Malformed("expected a JSON object".to_string()));
    };

    if envelope.get("is_error").and_then(Value::as_bool) == Some(true) {
        let message = envelope
            .get("result")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(AiError::Malformed(format!("model reported an error: {message}")));
    }

    match envelope.remove("structured_output") {
        Some(Value::Object(payload)) => Ok(Value::Object(payload)),
        // some CLI versions hand the payload back as a JSON string
        Some(Value::String(text)) => serde_json::from_str(&text)
            .map_err(|e| AiError::Malformed(format!("structured output is not JSON: {e}"))),
        Some(Value::Null) | None if envelope.get("type").and_then(Value::as_str) == Some("result") => {
            Err(AiError::Malformed("response has no structured output".to_string()))
        }
        None => Ok(Value::Object(envelope)),
        Some(other) => Err(AiError::Malformed(format!("unexpected structured output: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extracts_structured_output() {
        let stdout = r#"{"type":"result","is_error":false,"structured_output":{"size":"M"}}"#;
        assert_eq!(extract_payload(stdout).unwrap(), json!({"size": "M"}));
    }

    #[test]
    fn test_accepts_bare_payload() {
        assert_eq!(extract_payload(r#"{"size":"S"}"#).unwrap(), json!({"size": "S"}));
    }

    #[test]
    fn test_rejects_error_envelope() {
        let stdout = r#"{"type":"result","is_error":true,"result":"credit balance too low"}"#;
        let err = extract_payload(stdout).unwrap_err();
        assert!(err.to_string().contains("credit balance too low"));
    }

    #[test]
    fn test_rejects_envelope_without_payload() {
        let stdout = r#"{"type":"result","is_error":false,"result":"plain text"}"#;
        assert!(matches!(extract_payload(stdout), Err(AiError::Malformed(_))));
    }

    #[test]
    fn test_rejects_non_json() {
        assert!(matches!(extract_payload("Sure! Here is"), Err(AiError::Malformed(_))));
        assert!(matches!(extract_payload("[1, 2]"), Err(AiError::Malformed(_))));
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        /// Write an executable shell script standing in for the CLI
        fn fake_cli(dir: &tempfile::TempDir, script: &str) -> String {
            let path = dir.path().join("fake-claude");
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(file, "#!/bin/sh").unwrap();
            file.write_all(script.as_bytes()).unwrap();
            drop(file);
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path.to_string_lossy().into_owned()
        }

        fn cli(command: String, timeout: Duration) -> ClaudeCli {
            ClaudeCli::new(&AiSettings {
                command,
                model: "sonnet".to_string(),
                timeout,
            })
        }

        #[tokio::test]
        async fn test_prompt_goes_through_stdin() {
            let dir = tempfile::tempdir().unwrap();
            let log = dir.path().join("stdin.txt");
            let command = fake_cli(
                &dir,
                &format!(
                    "cat > '{}'\necho '{{\"type\":\"result\",\"is_error\":false,\"structured_output\":{{\"size\":\"L\"}}}}'\n",
                    log.display()
                ),
            );

            let prompt = "line one\nline 'two' with \"quotes\"\n";
            let value = cli(command, Duration::from_secs(10))
                .structured(prompt, &json!({"type": "object"}))
                .await
                .unwrap();

            assert_eq!(value, json!({"size": "L"}));
            assert_eq!(std::fs::read_to_string(&log).unwrap(), prompt);
        }

        #[tokio::test]
        async fn test_passes_model_and_schema_flags() {
            let dir = tempfile::tempdir().unwrap();
            let log = dir.path().join("args.txt");
            let command = fake_cli(
                &dir,
                &format!(
                    "printf '%s\\n' \"$@\" > '{}'\ncat > /dev/null\necho '{{\"ok\":true}}'\n",
                    log.display()
                ),
            );

            cli(command, Duration::from_secs(10))
                .structured("p", &json!({"type": "object"}))
                .await
                .unwrap();

            let args = std::fs::read_to_string(&log).unwrap();
            let args: Vec<&str> = args.lines().collect();
            assert_eq!(
                args,
                vec!["-p", "--model", "sonnet", "--output-format", "json", "--json-schema", r#"{"type":"object"}"#]
            );
        }

        #[tokio::test]
        async fn test_non_zero_exit() {
            let dir = tempfile::tempdir().unwrap();
            let command = fake_cli(&dir, "cat > /dev/null\necho 'not logged in' >&2\nexit 3\n");
            let err = cli(command, Duration::from_secs(10))
                .structured("p", &json!({}))
                .await
                .unwrap_err();
            match err {
                AiError::CommandFailed { code, stderr } => {
                    assert_eq!(code, 3);
                    assert_eq!(stderr, "not logged in");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_early_exit_reports_stderr() {
            let dir = tempfile::tempdir().unwrap();
            let command = fake_cli(&dir, "echo 'Invalid API key' >&2\nexit 1\n");
            let prompt = "x".repeat(4 * 1024 * 1024);
            let err = cli(command, Duration::from_secs(10))
                .structured(&prompt, &json!({}))
                .await
                .unwrap_err();
            match err {
                AiError::CommandFailed { code, stderr } => {
                    assert_eq!(code, 1);
                    assert_eq!(stderr, "Invalid API key");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_timeout() {
            let dir = tempfile::tempdir().unwrap();
            let command = fake_cli(&dir, "sleep 5\n");
            let err = cli(command, Duration::from_millis(200))
                .structured("p", &json!({}))
                .await
                .unwrap_err();
            assert!(matches!(err, AiError::Timeout(_)));
        }

        #[tokio::test]
        async fn test_missing_command() {
            let err = cli("/nonexistent/claude".to_string(), Duration::from_secs(1))
                .structured("p", &json!({}))
                .await
                .unwrap_err();
            assert!(matches!(err, AiError::NotFound(_)));
        }
    }
}
