//! The conversation driver: one bounded, turn-based interview per patient.
//!
//! A session owns its transcript and is used strictly sequentially; the
//! caller awaits each step before issuing the next. Service failures are
//! absorbed into a single degraded step and the interview is abandoned —
//! no verdict, no persisted record (admission only happens after a
//! concluded interview).

use super::client::{ChatService, ChatServiceError};
use super::prompt;
use super::verdict::{parse_reply, ParsedReply};
use super::InterviewError;
use crate::models::enums::SpeakerRole;
use crate::models::{ChatTurn, Patient, RiskVerdict};

/// Shown when the very first service call fails.
pub const MSG_DEGRADED_CONNECT: &str =
    "Desculpe, não consegui me conectar. Por favor, aguarde um atendente.";

/// Shown when a mid-interview service call fails.
pub const MSG_DEGRADED_REPLY: &str =
    "Ocorreu um erro ao processar sua resposta. Por favor, aguarde um atendente.";

/// Shown when the failure signature indicates quota/rate-limit exhaustion.
pub const MSG_DEGRADED_QUOTA: &str =
    "O sistema de triagem está temporariamente sobrecarregado. Por favor, dirija-se a um atendente para continuar.";

/// What the kiosk does next after one driver call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterviewStep {
    /// Display/speak the next assistant question and wait for the patient.
    Question(String),
    /// The interview reached a verdict. `farewell` is the conversational
    /// remainder for the presentation layer to display and speak.
    Concluded {
        verdict: RiskVerdict,
        farewell: Option<String>,
    },
    /// Service failure: show this utterance and route to a human attendant.
    Degraded(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Active,
    Concluded,
    Abandoned,
}

/// One interview session bound to a patient and an external chat service.
pub struct TriageInterview<'a, C: ChatService> {
    service: &'a C,
    system_instruction: String,
    opening: String,
    transcript: Vec<ChatTurn>,
    state: SessionState,
}

impl<'a, C: ChatService> TriageInterview<'a, C> {
    /// Open a fresh session and ask the service to begin the interview.
    ///
    /// The opening framing message is sent on the wire but kept out of the
    /// patient-visible transcript; the first assistant reply is appended.
    pub fn start(service: &'a C, patient: &Patient, initial_symptom: &str) -> (Self, InterviewStep) {
        let mut session = Self {
            service,
            system_instruction: prompt::system_instruction(patient, initial_symptom),
            opening: prompt::opening_message(initial_symptom),
            transcript: Vec::new(),
            state: SessionState::Active,
        };

        tracing::info!(patient = %patient.id, priority = patient.is_priority, "interview started");

        let step = match session.send() {
            Ok(raw) => session.process(&raw),
            Err(e) => session.degrade(&e, true),
        };
        (session, step)
    }

    /// Forward one patient utterance and return the next step.
    ///
    /// Appends exactly one patient turn and exactly one assistant turn,
    /// in call order. Errs only when the session already ended.
    pub fn reply(&mut self, utterance: &str) -> Result<InterviewStep, InterviewError> {
        match self.state {
            SessionState::Active => {}
            SessionState::Concluded => return Err(InterviewError::AlreadyConcluded),
            SessionState::Abandoned => return Err(InterviewError::Abandoned),
        }

        self.push_turn(SpeakerRole::Patient, utterance);

        let step = match self.send() {
            Ok(raw) => self.process(&raw),
            Err(e) => self.degrade(&e, false),
        };
        Ok(step)
    }

    /// The patient-visible transcript so far, in creation order.
    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    /// Consume the session, yielding the transcript for admission.
    pub fn into_transcript(self) -> Vec<ChatTurn> {
        self.transcript
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn is_abandoned(&self) -> bool {
        self.state == SessionState::Abandoned
    }

    // ── Internal ────────────────────────────────────────────

    /// Replay the whole conversation — the remote end is stateless between
    /// calls, so it must see the opening message and every prior turn.
    fn send(&self) -> Result<String, ChatServiceError> {
        let mut wire = Vec::with_capacity(self.transcript.len() + 1);
        wire.push(ChatTurn::new(0, SpeakerRole::Patient, self.opening.clone()));
        wire.extend(self.transcript.iter().cloned());
        self.service.converse(&self.system_instruction, &wire)
    }

    fn process(&mut self, raw: &str) -> InterviewStep {
        match parse_reply(raw) {
            ParsedReply::Terminal { verdict, remainder } => {
                let farewell = if remainder.is_empty() {
                    None
                } else {
                    self.push_turn(SpeakerRole::Assistant, &remainder);
                    Some(remainder)
                };
                self.state = SessionState::Concluded;
                tracing::info!(
                    risk = verdict.risk_level.as_str(),
                    turns = self.transcript.len(),
                    "interview concluded",
                );
                InterviewStep::Concluded { verdict, farewell }
            }
            ParsedReply::Prose(text) => {
                self.push_turn(SpeakerRole::Assistant, &text);
                InterviewStep::Question(text)
            }
        }
    }

    fn degrade(&mut self, err: &ChatServiceError, at_start: bool) -> InterviewStep {
        let message = if err.is_quota() {
            MSG_DEGRADED_QUOTA
        } else if at_start {
            MSG_DEGRADED_CONNECT
        } else {
            MSG_DEGRADED_REPLY
        };

        tracing::warn!(error = %err, "triage service unavailable, abandoning interview");
        self.push_turn(SpeakerRole::Assistant, message);
        self.state = SessionState::Abandoned;
        InterviewStep::Degraded(message.to_string())
    }

    fn push_turn(&mut self, role: SpeakerRole, text: &str) {
        let seq = self.transcript.len() as u32;
        self.transcript.push(ChatTurn::new(seq, role, text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::client::MockChatService;
    use crate::models::enums::RiskLevel;
    use uuid::Uuid;

    const TERMINAL_REPLY: &str =
        r#"Obrigado. Sua triagem está concluída. {"resumo_triagem":"Dor moderada","grau_risco":"amarelo"}"#;

    fn sample_patient() -> Patient {
        Patient {
            id: Uuid::new_v4(),
            full_name: "Carlos Lima".into(),
            age: 45,
            phone: "11911112222".into(),
            is_priority: false,
        }
    }

    #[test]
    fn start_returns_first_question() {
        let service = MockChatService::new().reply("Há quanto tempo sente isso?");
        let (session, step) = TriageInterview::start(&service, &sample_patient(), "dor de cabeça");

        assert_eq!(step, InterviewStep::Question("Há quanto tempo sente isso?".into()));
        assert!(session.is_active());
        // Only the assistant turn is patient-visible; the framing message is not
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript()[0].role, SpeakerRole::Assistant);
    }

    #[test]
    fn each_reply_appends_one_patient_and_one_assistant_turn() {
        let service = MockChatService::new()
            .reply("Pergunta um?")
            .reply("Pergunta dois?");
        let (mut session, _) = TriageInterview::start(&service, &sample_patient(), "febre");

        session.reply("desde ontem").unwrap();

        let roles: Vec<SpeakerRole> = session.transcript().iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![SpeakerRole::Assistant, SpeakerRole::Patient, SpeakerRole::Assistant],
        );
        let seqs: Vec<u32> = session.transcript().iter().map(|t| t.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
    }

    #[test]
    fn wire_history_grows_with_every_call() {
        let service = MockChatService::new()
            .reply("Pergunta um?")
            .reply("Pergunta dois?");
        let (mut session, _) = TriageInterview::start(&service, &sample_patient(), "febre");
        session.reply("desde ontem").unwrap();

        // start: opening only; reply: opening + assistant + patient
        assert_eq!(service.wire_lengths(), vec![1, 3]);
    }

    #[test]
    fn terminal_reply_concludes_with_verdict_and_farewell() {
        let service = MockChatService::new().reply("Sente falta de ar?").reply(TERMINAL_REPLY);
        let (mut session, _) = TriageInterview::start(&service, &sample_patient(), "dor moderada");

        let step = session.reply("não").unwrap();
        let InterviewStep::Concluded { verdict, farewell } = step else {
            panic!("expected conclusion");
        };
        assert_eq!(verdict.risk_level, RiskLevel::Amarelo);
        assert_eq!(verdict.summary, "Dor moderada");
        assert_eq!(farewell.as_deref(), Some("Obrigado. Sua triagem está concluída."));

        // Farewell prose is the last transcript turn
        let last = session.transcript().last().unwrap();
        assert_eq!(last.role, SpeakerRole::Assistant);
        assert_eq!(last.text, "Obrigado. Sua triagem está concluída.");
        assert!(!session.is_active());
    }

    #[test]
    fn bare_json_conclusion_has_no_farewell() {
        let service = MockChatService::new()
            .reply(r#"{"resumo_triagem":"Risco imediato","grau_risco":"vermelho"}"#);
        let (_, step) = TriageInterview::start(&service, &sample_patient(), "dor no peito");

        let InterviewStep::Concluded { verdict, farewell } = step else {
            panic!("expected conclusion");
        };
        assert_eq!(verdict.risk_level, RiskLevel::Vermelho);
        assert!(farewell.is_none());
    }

    #[test]
    fn malformed_payload_keeps_interview_going() {
        let service = MockChatService::new().reply(r#"Analisando: {"grau_risco": }"#);
        let (session, step) = TriageInterview::start(&service, &sample_patient(), "tontura");

        assert_eq!(
            step,
            InterviewStep::Question(r#"Analisando: {"grau_risco": }"#.into()),
        );
        assert!(session.is_active());
    }

    #[test]
    fn connect_failure_at_start_degrades_with_connect_message() {
        let service =
            MockChatService::new().failure(ChatServiceError::Connection("http://x".into()));
        let (session, step) = TriageInterview::start(&service, &sample_patient(), "tosse");

        assert_eq!(step, InterviewStep::Degraded(MSG_DEGRADED_CONNECT.into()));
        assert!(session.is_abandoned());
    }

    #[test]
    fn failure_mid_interview_uses_reply_message() {
        let service = MockChatService::new()
            .reply("Pergunta?")
            .failure(ChatServiceError::Timeout(30));
        let (mut session, _) = TriageInterview::start(&service, &sample_patient(), "tosse");

        let step = session.reply("sim").unwrap();
        assert_eq!(step, InterviewStep::Degraded(MSG_DEGRADED_REPLY.into()));
    }

    #[test]
    fn quota_failure_uses_overload_message() {
        let service = MockChatService::new().failure(ChatServiceError::QuotaExceeded {
            status: 429,
            body: "RESOURCE_EXHAUSTED".into(),
        });
        let (_, step) = TriageInterview::start(&service, &sample_patient(), "tosse");
        assert_eq!(step, InterviewStep::Degraded(MSG_DEGRADED_QUOTA.into()));
    }

    #[test]
    fn abandoned_session_rejects_further_replies() {
        let service =
            MockChatService::new().failure(ChatServiceError::Connection("http://x".into()));
        let (mut session, _) = TriageInterview::start(&service, &sample_patient(), "tosse");

        assert_eq!(session.reply("alô?"), Err(InterviewError::Abandoned));
    }

    #[test]
    fn concluded_session_rejects_further_replies() {
        let service = MockChatService::new().reply(TERMINAL_REPLY);
        let (mut session, _) = TriageInterview::start(&service, &sample_patient(), "dor");

        assert_eq!(session.reply("mais uma coisa"), Err(InterviewError::AlreadyConcluded));
    }

    #[test]
    fn long_interview_is_never_truncated_by_the_driver() {
        // The 5-question target is a prompt convention, not a driver cap
        let mut service = MockChatService::new();
        for i in 0..9 {
            service = service.reply(&format!("Pergunta {i}?"));
        }
        let service = service.reply(TERMINAL_REPLY);

        let (mut session, mut step) = TriageInterview::start(&service, &sample_patient(), "dor");
        let mut answers = 0;
        while let InterviewStep::Question(_) = step {
            step = session.reply("sim").unwrap();
            answers += 1;
        }
        assert!(matches!(step, InterviewStep::Concluded { .. }));
        assert_eq!(answers, 9);
    }
}
