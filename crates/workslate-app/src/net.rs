//! HTTP-backed assistant and the worker thread that runs its calls.

use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use workslate_core::assistant::{Assistant, AssistantError, ChatRequest, Language, parse_translation_response};
use workslate_core::config::AssistantConfig;
use workslate_core::editor::{ChatTicket, TranslationTicket};

/// Source language sent with translation requests.
const SOURCE_LANGUAGE: &str = "autodetect";

fn request_error(e: reqwest::Error) -> AssistantError {
    AssistantError::Request(e.to_string())
}

/// Chat and translation over the public endpoints in [`AssistantConfig`].
pub struct HttpAssistant {
    client: reqwest::blocking::Client,
    chat_url: String,
    translate_url: String,
    email: Option<String>,
}

impl HttpAssistant {
    pub fn new(config: &AssistantConfig) -> Result<Self, AssistantError> {
        // Assistant calls wait as long as the service takes.
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(request_error)?;
        Ok(Self {
            client,
            chat_url: config.chat_url.clone(),
            translate_url: config.translate_url.clone(),
            email: config.translate_email.clone(),
        })
    }

    /// Query parameters for a translation request.
    fn translate_query(&self, text: &str, target: Language) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("q", text.to_string()),
            ("langpair", format!("{SOURCE_LANGUAGE}|{}", target.code())),
        ];
        if let Some(email) = &self.email {
            query.push(("de", email.clone()));
        }
        query
    }
}

impl Assistant for HttpAssistant {
    fn chat(&self, request: &ChatRequest) -> Result<String, AssistantError> {
        let response = self
            .client
            .post(&self.chat_url)
            .json(request)
            .send()
            .map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(AssistantError::Status {
                status: status.as_u16(),
                message: "AI Service Busy".to_string(),
            });
        }
        let text = response.text().map_err(request_error)?;
        if text.trim().is_empty() {
            return Err(AssistantError::Empty);
        }
        Ok(text)
    }

    fn translate(&self, text: &str, target: Language) -> Result<String, AssistantError> {
        let body = self
            .client
            .get(&self.translate_url)
            .query(&self.translate_query(text, target))
            .send()
            .map_err(request_error)?
            .text()
            .map_err(request_error)?;
        parse_translation_response(&body)
    }
}

/// Work handed to the assistant thread.
#[derive(Debug)]
pub enum AssistantJob {
    Translate(TranslationTicket),
    Chat(ChatTicket, ChatRequest),
}

/// Result of an [`AssistantJob`], delivered back to the event loop.
#[derive(Debug)]
pub enum AssistantReply {
    Translated(TranslationTicket, Result<String, AssistantError>),
    Answered(ChatTicket, Result<String, AssistantError>),
}

/// Runs blocking assistant calls off the event loop.
pub struct AssistantWorker {
    jobs: Option<Sender<AssistantJob>>,
    handle: Option<JoinHandle<()>>,
}

impl AssistantWorker {
    /// Start the worker; `deliver` is called on the worker thread with each
    /// reply and returns false once nobody is listening.
    pub fn spawn(
        assistant: Arc<dyn Assistant>,
        deliver: impl Fn(AssistantReply) -> bool + Send + 'static,
    ) -> std::io::Result<Self> {
        let (jobs, queue) = mpsc::channel::<AssistantJob>();
        let handle = thread::Builder::new()
            .name("assistant".to_string())
            .spawn(move || {
                for job in queue {
                    let reply = match job {
                        AssistantJob::Translate(ticket) => {
                            log::debug!("Translating ticket {} to {}", ticket.id, ticket.language.name());
                            let result = assistant.translate(&ticket.text, ticket.language);
                            AssistantReply::Translated(ticket, result)
                        }
                        AssistantJob::Chat(ticket, request) => {
                            log::debug!("Asking ticket {} with {} messages", ticket.id, request.messages.len());
                            AssistantReply::Answered(ticket, assistant.chat(&request))
                        }
                    };
                    if !deliver(reply) {
                        break;
                    }
                }
                log::debug!("Assistant worker stopped");
            })?;
        Ok(Self {
            jobs: Some(jobs),
            handle: Some(handle),
        })
    }

    /// Queue a job; returns it back if the worker has gone away.
    pub fn submit(&self, job: AssistantJob) -> Result<(), AssistantJob> {
        match &self.jobs {
            Some(jobs) => jobs.send(job).map_err(|e| e.0),
            None => Err(job),
        }
    }
}

impl Drop for AssistantWorker {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop.
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Assistant worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use workslate_core::assistant::{AssistantLevel, ChatSession};
    use workslate_core::editor::Editor;
    use workslate_core::input::{MouseButton, PointerEvent};
    use workslate_core::tools::ToolKind;

    struct EchoAssistant;

    impl Assistant for EchoAssistant {
        fn chat(&self, request: &ChatRequest) -> Result<String, AssistantError> {
            Ok(format!("{} messages", request.messages.len()))
        }

        fn translate(&self, text: &str, target: Language) -> Result<String, AssistantError> {
            Ok(format!("{text} ({})", target.code()))
        }
    }

    fn config(email: Option<&str>) -> AssistantConfig {
        AssistantConfig {
            translate_email: email.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_translate_query() {
        let assistant = HttpAssistant::new(&config(None)).unwrap();
        let query = assistant.translate_query("hello", Language::Spanish);
        assert_eq!(query[0], ("q", "hello".to_string()));
        assert_eq!(query[1], ("langpair", "autodetect|es".to_string()));
        assert_eq!(query.len(), 2);

        let assistant = HttpAssistant::new(&config(Some("me@example.com"))).unwrap();
        let query = assistant.translate_query("hello", Language::French);
        assert_eq!(query[2], ("de", "me@example.com".to_string()));
    }

    #[test]
    fn test_worker_round_trip_fills_placeholder() {
        let mut editor = Editor::default();
        editor.load_project(r#"[[{"type":"text","x":10,"y":10,"text":"hello","fontSize":36}]]"#);
        editor.set_tool(ToolKind::Select);
        let position = Point::new(20.0, 20.0);
        editor.dispatch(PointerEvent::Down { position, button: MouseButton::Left });
        editor.dispatch(PointerEvent::Up { position, button: MouseButton::Left });
        assert_eq!(editor.selection().indices(), &[0]);
        let ticket = editor.begin_translation(Language::German).unwrap();

        let (tx, rx) = mpsc::channel();
        let worker = AssistantWorker::spawn(Arc::new(EchoAssistant), move |reply| tx.send(reply).is_ok()).unwrap();
        worker.submit(AssistantJob::Translate(ticket)).unwrap();
        let Ok(AssistantReply::Translated(ticket, result)) = rx.recv_timeout(Duration::from_secs(5)) else {
            panic!("expected a translation");
        };
        assert_eq!(result.as_deref().ok(), Some("hello (de)"));

        editor.finish_translation(&ticket, result);
        let translated = editor.current_slide().get(1).and_then(|o| o.as_text()).unwrap();
        assert_eq!(translated.text, "hello (de)");
    }

    #[test]
    fn test_chat_job_answers_into_session() {
        let mut editor = Editor::default();
        editor.load_project(r#"[[{"type":"text","x":10,"y":10,"text":"What is 2+2?","fontSize":36}]]"#);
        editor.set_tool(ToolKind::Select);
        let position = Point::new(20.0, 20.0);
        editor.dispatch(PointerEvent::Down { position, button: MouseButton::Left });
        editor.dispatch(PointerEvent::Up { position, button: MouseButton::Left });
        let ticket = editor.begin_chat().unwrap();
        let mut session = ChatSession::new(AssistantLevel::Ks2);
        let request = session.ask(&ticket.question).unwrap();

        let (tx, rx) = mpsc::channel();
        let worker = AssistantWorker::spawn(Arc::new(EchoAssistant), move |reply| tx.send(reply).is_ok()).unwrap();
        worker.submit(AssistantJob::Chat(ticket, request)).unwrap();
        let Ok(AssistantReply::Answered(ticket, result)) = rx.recv_timeout(Duration::from_secs(5)) else {
            panic!("expected an answer");
        };

        let answer = session.reply_or_fallback(result).to_string();
        assert_eq!(answer, "2 messages");
        assert_eq!(session.messages().len(), 2);
        editor.finish_chat(&ticket, &answer);
        let text = editor.current_slide().get(1).and_then(|o| o.as_text()).unwrap();
        assert_eq!(text.text, "2 messages");
    }
}
