//! Guided question flows.
//!
//! A small state machine for collecting a part number (and, for
//! compatibility checks, a model number) before a question is sent to the
//! chat pipeline. The slot being waited for is explicit client state: the
//! caller stores the returned [`PendingSlot`] and passes it back with the
//! next input.

/// Phrases that mean the user does not have the requested information.
const VAGUE_PHRASES: [&str; 5] = ["i don't know", "idk", "not sure", "no idea", "unknown"];

/// A guided flow the user can start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidedFlow {
    /// Check whether a part fits a model.
    Compatibility,
    /// Installation help for a part.
    Installation,
    /// General information about a part.
    About,
}

/// The piece of information the flow is waiting for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PendingSlot {
    /// No flow in progress; input goes straight to the chat pipeline.
    #[default]
    None,
    /// Compatibility flow, waiting for the part number.
    AwaitingPart,
    /// Compatibility flow, waiting for the model number.
    AwaitingModel {
        /// The part number collected in the previous step.
        part: String,
    },
    /// Installation flow, waiting for the part number.
    AwaitingInstallTarget,
    /// About flow, waiting for the part number.
    AwaitingAboutTarget,
}

/// What the caller should do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowAction {
    /// Show this assistant message locally; nothing is sent to the server.
    Prompt(String),
    /// Send this user message through the chat pipeline.
    Send(String),
    /// Nothing to do (blank input).
    Ignore,
}

/// The result of starting or advancing a flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The slot to store for the next input.
    pub next: PendingSlot,
    /// What to do now.
    pub action: FlowAction,
}

impl Transition {
    fn prompt(next: PendingSlot, message: &str) -> Self {
        Self { next, action: FlowAction::Prompt(message.to_string()) }
    }

    fn send(message: String) -> Self {
        Self { next: PendingSlot::None, action: FlowAction::Send(message) }
    }
}

/// Whether `input` says the user does not know the answer.
pub fn is_vague(input: &str) -> bool {
    let lower = input.to_lowercase();
    VAGUE_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Enter `flow`, asking for its first piece of information.
pub fn start(flow: GuidedFlow) -> Transition {
    match flow {
        GuidedFlow::Compatibility => Transition::prompt(
            PendingSlot::AwaitingPart,
            "What is the manufacturer part number of the refrigerator/dishwasher part that you \
             would like to check compatibility for (e.g., W10144820)?",
        ),
        GuidedFlow::Installation => Transition::prompt(
            PendingSlot::AwaitingInstallTarget,
            "What part do you need help installing? Input manufacturer part number \
             (e.g., W10144820):",
        ),
        GuidedFlow::About => Transition::prompt(
            PendingSlot::AwaitingAboutTarget,
            "Which part would you like to learn about? Input manufacturer part number \
             (e.g., W10144820):",
        ),
    }
}

/// Advance from `slot` with the user's `input`.
///
/// | slot | input | next | action |
/// |------|-------|------|--------|
/// | any | blank | same | ignore |
/// | `None` | text | `None` | send text |
/// | awaiting anything | vague | same | help prompt |
/// | `AwaitingPart` | part | `AwaitingModel` | ask for model |
/// | `AwaitingModel` | model | `None` | send compatibility question |
/// | `AwaitingInstallTarget` | part | `None` | send installation question |
/// | `AwaitingAboutTarget` | part | `None` | send about question |
pub fn advance(slot: &PendingSlot, input: &str) -> Transition {
    let input = input.trim();
    if input.is_empty() {
        return Transition { next: slot.clone(), action: FlowAction::Ignore };
    }
    if *slot != PendingSlot::None && is_vague(input) {
        return Transition::prompt(slot.clone(), help_for(slot));
    }

    match slot {
        PendingSlot::None => Transition::send(input.to_string()),
        PendingSlot::AwaitingPart => Transition::prompt(
            PendingSlot::AwaitingModel { part: input.to_string() },
            "What is the model number of the refrigerator/dishwasher that you would like to \
             check compatibility for?",
        ),
        PendingSlot::AwaitingModel { part } => {
            Transition::send(format!("Is part {part} compatible with model {input}?"))
        }
        PendingSlot::AwaitingInstallTarget => {
            Transition::send(format!("How do I install part {input}?"))
        }
        PendingSlot::AwaitingAboutTarget => Transition::send(format!("Tell me about part {input}")),
    }
}

fn help_for(slot: &PendingSlot) -> &'static str {
    match slot {
        PendingSlot::AwaitingPart => {
            "No worries! You can [look up your part number here](https://www.partselect.com/Brands/). \
             Type in the part number when you are ready!"
        }
        PendingSlot::AwaitingModel { .. } => {
            "Totally okay! You can [find your model number here](https://www.partselect.com/Brands/). \
             Type in the model number when you are ready!"
        }
        PendingSlot::AwaitingInstallTarget => {
            "That's okay! You can also describe the issue and I'll try to help."
        }
        PendingSlot::AwaitingAboutTarget => {
            "No problem! If you find the part number later, I'll be here to help. You can browse \
             [PartSelect here](https://www.partselect.com/)."
        }
        PendingSlot::None => "",
    }
}
