//! The message-exchange state machine.
//!
//! A [`Conversation`] owns the transcript, the draft, the panel flag and the
//! `pending` flag. It moves between two phases:
//!
//! ```text
//!            submit (non-blank draft)
//!   Idle ─────────────────────────────▶ Awaiting
//!    ▲                                     │
//!    └──────── reply or failure ───────────┘
//! ```
//!
//! Admission hands out a [`ReplyTicket`]; resolving the ticket appends the
//! bot message and returns to `Idle`. A second ticket is never issued while
//! one is outstanding, so at most one request per conversation is in flight.
//! Tickets carry the id of the conversation that issued them and are refused
//! anywhere else.
//!
//! [`ConversationController`] pairs a conversation with a
//! [`GenerationService`] and drives the exchange either in one future
//! ([`ConversationController::submit`]) or as a spawned task the caller polls
//! ([`ConversationController::dispatch`] / [`ConversationController::complete`]).

use crate::generation::{generate_within, GenerationError, GenerationService};
use crate::message::{Message, Transcript};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Bot reply shown when the generation service fails.
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// Phase of the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No request outstanding; submissions are accepted.
    Idle,
    /// A request is in flight; submissions are ignored.
    Awaiting,
}

/// Why a submission was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The draft is empty or whitespace only.
    BlankDraft,
    /// A request is already in flight.
    Pending,
    /// The reply ticket was issued by another conversation.
    ForeignTicket,
}

/// What a submission did to the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing changed.
    Ignored(Rejection),
    /// The service's reply was appended.
    Replied,
    /// The service failed and [`FALLBACK_REPLY`] was appended.
    Fallback,
}

impl SubmitOutcome {
    /// Whether the submission was admitted (and the transcript grew by two).
    pub fn is_admitted(self) -> bool {
        !matches!(self, Self::Ignored(_))
    }
}

/// The single outstanding exchange of a conversation.
///
/// Only [`Conversation::begin_submit`] creates tickets and only
/// [`Conversation::resolve`] consumes them.
#[derive(Debug)]
#[must_use = "an unresolved ticket leaves the conversation awaiting a reply"]
pub struct ReplyTicket {
    conversation: Uuid,
    prompt: String,
}

impl ReplyTicket {
    /// Id of the conversation that issued this ticket.
    pub fn conversation(&self) -> Uuid {
        self.conversation
    }

    /// The text sent to the generation service.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// Conversation state for one widget instance.
#[derive(Debug)]
pub struct Conversation {
    id: Uuid,
    transcript: Transcript,
    draft: String,
    panel_open: bool,
    pending: bool,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// Create an idle conversation with a closed panel and empty transcript.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            transcript: Transcript::new(),
            draft: String::new(),
            panel_open: false,
            pending: false,
        }
    }

    /// Identifier used to tell conversations apart in logs.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn phase(&self) -> Phase {
        if self.pending {
            Phase::Awaiting
        } else {
            Phase::Idle
        }
    }

    /// Flip panel visibility and return the new value.
    pub fn toggle_panel(&mut self) -> bool {
        self.panel_open = !self.panel_open;
        debug!(conversation = %self.id, open = self.panel_open, "panel toggled");
        self.panel_open
    }

    /// Replace the draft. Any text is accepted.
    pub fn update_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Admit the current draft.
    ///
    /// On success the user message is appended, the draft is cleared and the
    /// conversation is `Awaiting` until the returned ticket is resolved.
    pub fn begin_submit(&mut self) -> Result<ReplyTicket, Rejection> {
        if self.pending {
            debug!(conversation = %self.id, "submit ignored: request already in flight");
            return Err(Rejection::Pending);
        }
        if self.draft.trim().is_empty() {
            debug!(conversation = %self.id, "submit ignored: blank draft");
            return Err(Rejection::BlankDraft);
        }

        let prompt = std::mem::take(&mut self.draft);
        self.transcript.push(Message::user(prompt.clone()));
        self.pending = true;

        info!(
            conversation = %self.id,
            chars = prompt.chars().count(),
            "prompt submitted"
        );
        Ok(ReplyTicket {
            conversation: self.id,
            prompt,
        })
    }

    /// Finish the outstanding exchange with the service's result.
    ///
    /// A ticket from another conversation is ignored and leaves this one
    /// untouched.
    pub fn resolve(
        &mut self,
        ticket: ReplyTicket,
        result: Result<String, GenerationError>,
    ) -> SubmitOutcome {
        if !self.owns(&ticket) {
            debug!(
                conversation = %self.id,
                ticket = %ticket.conversation,
                "reply ignored: ticket belongs to another conversation"
            );
            return SubmitOutcome::Ignored(Rejection::ForeignTicket);
        }

        let outcome = match result {
            Ok(text) => {
                debug!(conversation = %self.id, chars = text.chars().count(), "reply received");
                self.transcript.push(Message::bot(text));
                SubmitOutcome::Replied
            }
            Err(error) => {
                warn!(
                    conversation = %self.id,
                    prompt_chars = ticket.prompt.chars().count(),
                    %error,
                    "generation failed, showing fallback reply"
                );
                self.transcript.push(Message::bot(FALLBACK_REPLY));
                SubmitOutcome::Fallback
            }
        };
        self.pending = false;
        outcome
    }

    fn owns(&self, ticket: &ReplyTicket) -> bool {
        ticket.conversation == self.id && self.pending
    }
}

/// A generation request running on the tokio runtime.
#[derive(Debug)]
#[must_use = "pass to ConversationController::complete to return to idle"]
pub struct InFlight {
    ticket: ReplyTicket,
    handle: JoinHandle<Result<String, GenerationError>>,
}

impl InFlight {
    pub fn prompt(&self) -> &str {
        self.ticket.prompt()
    }

    /// Whether the request has finished (successfully or not).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop the request. Completing an aborted request yields the fallback reply.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

/// Resolves the exchange if a `submit` future is dropped mid-request.
struct ResolveOnDrop<'a> {
    conversation: &'a mut Conversation,
    ticket: Option<ReplyTicket>,
}

impl ResolveOnDrop<'_> {
    fn finish(mut self, result: Result<String, GenerationError>) -> SubmitOutcome {
        match self.ticket.take() {
            Some(ticket) => self.conversation.resolve(ticket, result),
            None => SubmitOutcome::Ignored(Rejection::Pending),
        }
    }
}

impl Drop for ResolveOnDrop<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.conversation.resolve(
                ticket,
                Err(GenerationError::Interrupted("submission dropped".into())),
            );
        }
    }
}

/// Drives a [`Conversation`] against a [`GenerationService`].
pub struct ConversationController {
    conversation: Conversation,
    service: Arc<dyn GenerationService>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for ConversationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationController")
            .field("conversation", &self.conversation)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ConversationController {
    /// Create a controller with a fresh conversation and no request timeout.
    pub fn new(service: Arc<dyn GenerationService>) -> Self {
        Self {
            conversation: Conversation::new(),
            service,
            timeout: None,
        }
    }

    /// Bound each request by `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// See [`Conversation::toggle_panel`].
    pub fn toggle_panel(&mut self) -> bool {
        self.conversation.toggle_panel()
    }

    /// See [`Conversation::update_draft`].
    pub fn update_draft(&mut self, text: impl Into<String>) {
        self.conversation.update_draft(text);
    }

    /// Run one full exchange: admit the draft, await the service, append the reply.
    ///
    /// Dropping the returned future before it completes still returns the
    /// conversation to idle, with the fallback reply appended.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let ticket = match self.conversation.begin_submit() {
            Ok(ticket) => ticket,
            Err(rejection) => return SubmitOutcome::Ignored(rejection),
        };

        let prompt = ticket.prompt().to_string();
        let guard = ResolveOnDrop {
            conversation: &mut self.conversation,
            ticket: Some(ticket),
        };
        let result = generate_within(self.service.as_ref(), &prompt, self.timeout).await;
        guard.finish(result)
    }

    /// Admit the draft and start the request on a spawned task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&mut self) -> Result<InFlight, Rejection> {
        let ticket = self.conversation.begin_submit()?;

        let service = Arc::clone(&self.service);
        let prompt = ticket.prompt().to_string();
        let timeout = self.timeout;
        let handle =
            tokio::spawn(async move { generate_within(service.as_ref(), &prompt, timeout).await });

        Ok(InFlight { ticket, handle })
    }

    /// Wait for a dispatched request and append its reply.
    ///
    /// A request dispatched by another controller is handed back unawaited so
    /// it can still be completed by its owner.
    pub async fn complete(&mut self, in_flight: InFlight) -> Result<SubmitOutcome, InFlight> {
        if !self.conversation.owns(&in_flight.ticket) {
            debug!(
                conversation = %self.conversation.id,
                ticket = %in_flight.ticket.conversation,
                "completion refused: request belongs to another conversation"
            );
            return Err(in_flight);
        }

        let InFlight { ticket, handle } = in_flight;
        let result = match handle.await {
            Ok(result) => result,
            Err(join_error) => Err(GenerationError::Interrupted(join_error.to_string())),
        };
        Ok(self.conversation.resolve(ticket, result))
    }
}
