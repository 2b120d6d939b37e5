//! Provider state to canonical event translation
//!
//! | code | state      | events                               | paused | ended |
//! |------|------------|--------------------------------------|--------|-------|
//! | -1   | unstarted  | loadedmetadata                       | true   | false |
//! | 0    | ended      | ended                                | false  | true  |
//! | 1    | playing    | play, playing                        | false  | false |
//! | 2    | paused     | pause                                | true   | false |
//! | 3    | buffering  | progress                             | false  | false |
//! | 5    | cued       | loadeddata, loadedmetadata, canplay  | true   | false |
//!
//! Transitions are pushed by the provider; the adapter only requests actions
//! and observes the resulting state.

use crate::{
    events::EventKind,
    types::{ProviderState, ShadowState},
};

const UNSTARTED_EVENTS: &[EventKind] = &[EventKind::LoadedMetadata];
const ENDED_EVENTS: &[EventKind] = &[EventKind::Ended];
const PLAYING_EVENTS: &[EventKind] = &[EventKind::Play, EventKind::Playing];
const PAUSED_EVENTS: &[EventKind] = &[EventKind::Pause];
const BUFFERING_EVENTS: &[EventKind] = &[EventKind::Progress];
const CUED_EVENTS: &[EventKind] = &[
    EventKind::LoadedData,
    EventKind::LoadedMetadata,
    EventKind::CanPlay,
];

/// What the progress poller should do after a state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerCommand {
    Start,
    Stop,
    Unchanged,
}

/// Outcome of a provider state change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// `None` for codes outside the provider enumeration
    pub state: Option<ProviderState>,
    /// Events to dispatch, in order
    pub events: &'static [EventKind],
    pub shadow: ShadowState,
    pub poller: PollerCommand,
}

/// Translate a provider state code
///
/// Unknown codes emit nothing and leave `current` untouched.
pub fn translate(code: i32, current: ShadowState) -> Translation {
    let Some(state) = ProviderState::from_code(code) else {
        return Translation {
            state: None,
            events: &[],
            shadow: current,
            poller: PollerCommand::Unchanged,
        };
    };

    let (events, paused, ended, poller) = match state {
        ProviderState::Unstarted => (UNSTARTED_EVENTS, true, false, PollerCommand::Unchanged),
        ProviderState::Ended => (ENDED_EVENTS, false, true, PollerCommand::Stop),
        ProviderState::Playing => (PLAYING_EVENTS, false, false, PollerCommand::Start),
        ProviderState::Paused => (PAUSED_EVENTS, true, false, PollerCommand::Stop),
        ProviderState::Buffering => (BUFFERING_EVENTS, false, false, PollerCommand::Unchanged),
        ProviderState::Cued => (CUED_EVENTS, true, false, PollerCommand::Unchanged),
    };

    Translation {
        state: Some(state),
        events,
        shadow: ShadowState { paused, ended },
        poller,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cued_play_pause_end_sequence() {
        let mut shadow = ShadowState::default();
        let mut seen = Vec::new();

        for code in [5, 1, 2, 0] {
            let t = translate(code, shadow);
            seen.push((t.events.to_vec(), t.poller));
            shadow = t.shadow;
        }

        assert_eq!(
            seen,
            vec![
                (
                    vec![EventKind::LoadedData, EventKind::LoadedMetadata, EventKind::CanPlay],
                    PollerCommand::Unchanged
                ),
                (vec![EventKind::Play, EventKind::Playing], PollerCommand::Start),
                (vec![EventKind::Pause], PollerCommand::Stop),
                (vec![EventKind::Ended], PollerCommand::Stop),
            ]
        );
        assert_eq!(shadow, ShadowState { paused: false, ended: true });
    }

    #[test]
    fn test_unstarted_and_buffering() {
        let ended = ShadowState { paused: false, ended: true };

        let t = translate(-1, ended);
        assert_eq!(t.events, &[EventKind::LoadedMetadata]);
        assert_eq!(t.shadow, ShadowState { paused: true, ended: false });

        let t = translate(3, ShadowState::default());
        assert_eq!(t.events, &[EventKind::Progress]);
        assert_eq!(t.shadow, ShadowState { paused: false, ended: false });
        assert_eq!(t.poller, PollerCommand::Unchanged);
    }

    #[test]
    fn test_unknown_code_is_inert() {
        let current = ShadowState { paused: false, ended: true };
        for code in [4, 6, -2, 99] {
            let t = translate(code, current);
            assert!(t.state.is_none());
            assert!(t.events.is_empty());
            assert_eq!(t.shadow, current);
            assert_eq!(t.poller, PollerCommand::Unchanged);
        }
    }
}
