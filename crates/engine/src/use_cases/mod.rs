//! Use case orchestration over the catalog and the session store.

pub mod dialogue;
pub mod suggest;

pub use dialogue::{
    AdvanceError, ChoiceOutcome, ChoiceResult, OfferedChoice, ProcessChoice, StartError,
    StartScenario, StartedSession,
};
pub use suggest::{ScenarioSuggestion, SuggestError, SuggestScenario};
