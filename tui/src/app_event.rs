//! Messages flowing into the top-level `App` loop.
//!
//! Composer callbacks post their results here instead of touching `App`
//! state from inside a key dispatch. Terminal input is read separately.

use huddle_composer::SubmitValue;

use crate::app::MessageId;

#[derive(Debug)]
pub(crate) enum AppEvent {
    /// The main composer submitted a new message.
    SubmitMessage(SubmitValue),

    /// The edit composer saved changes to an existing message.
    SaveEdit {
        message_id: MessageId,
        value: SubmitValue,
    },

    /// The edit composer was cancelled.
    CancelEdit,
}
