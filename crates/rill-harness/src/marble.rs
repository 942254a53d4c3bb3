#![forbid(unsafe_code)]

//! Marble diagram parsing.
//!
//! A marble diagram describes a stream's timeline one character per frame:
//!
//! - `-` advances one frame with no notification
//! - letters and digits emit the value bound to that character
//! - `|` completes, `#` fails
//! - `(...)` groups notifications onto the frame of the `(`; the group
//!   still occupies its character width in frames
//! - `^` marks the subscription point of a hot stream; notifications to its
//!   left happen before frame 0
//! - spaces are ignored, so diagrams can be aligned vertically
//!
//! Subscription diagrams use `^` for the subscribe frame and `!` for the
//! unsubscribe frame.
//!
//! Parsers return structured [`MarbleError`]s; the assertion layer turns
//! them into panics with the offending diagram attached.

use thiserror::Error;

use rill_core::StreamError;

/// One parsed stream event.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification<T> {
    /// A value emission.
    Value(T),
    /// Terminal failure.
    Error(StreamError),
    /// Normal completion.
    Complete,
}

/// Malformed marble diagram.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarbleError {
    /// A value character with no binding in the value table.
    #[error("no value bound to marble character `{0}`")]
    UnknownValue(char),
    /// A character that is not part of the marble grammar.
    #[error("unexpected character `{0}` in marble diagram")]
    UnexpectedChar(char),
    /// A notification after `|` or `#`.
    #[error("notification after terminal event")]
    AfterTerminal,
    /// A `(` without a matching `)`.
    #[error("unclosed group")]
    UnclosedGroup,
    /// A `(` inside a group.
    #[error("nested group")]
    NestedGroup,
    /// A `)` outside a group.
    #[error("`)` without a matching `(`")]
    UnmatchedGroupClose,
    /// More than one `^`.
    #[error("more than one subscription point `^`")]
    DuplicateSubscribePoint,
    /// More than one `!` in a subscription diagram.
    #[error("more than one unsubscribe point `!`")]
    DuplicateUnsubscribePoint,
    /// A subscription diagram without `^`.
    #[error("subscription diagram has no `^`")]
    MissingSubscribePoint,
}

/// Parse a marble diagram into `(frame, notification)` pairs using the
/// default error for `#`.
///
/// Frames are relative to `^` when present (entries left of it come out
/// negative), otherwise relative to the start of the diagram.
pub fn parse_marbles<T: Clone>(
    diagram: &str,
    values: &[(char, T)],
) -> Result<Vec<(i64, Notification<T>)>, MarbleError> {
    parse_marbles_with_error(diagram, values, StreamError::source("marble error"))
}

/// Like [`parse_marbles`], with a caller-supplied failure for `#`.
pub fn parse_marbles_with_error<T: Clone>(
    diagram: &str,
    values: &[(char, T)],
    error: StreamError,
) -> Result<Vec<(i64, Notification<T>)>, MarbleError> {
    let mut out: Vec<(i64, Notification<T>)> = Vec::new();
    let mut frame: i64 = 0;
    let mut group_start: Option<i64> = None;
    let mut terminated = false;
    let mut zero: Option<i64> = None;

    for ch in diagram.chars() {
        let at = group_start.unwrap_or(frame);
        match ch {
            ' ' => continue,
            '-' => {}
            '^' => {
                if zero.is_some() {
                    return Err(MarbleError::DuplicateSubscribePoint);
                }
                zero = Some(frame);
            }
            '(' => {
                if group_start.is_some() {
                    return Err(MarbleError::NestedGroup);
                }
                group_start = Some(frame);
            }
            ')' => {
                if group_start.take().is_none() {
                    return Err(MarbleError::UnmatchedGroupClose);
                }
            }
            '|' => {
                if terminated {
                    return Err(MarbleError::AfterTerminal);
                }
                terminated = true;
                out.push((at, Notification::Complete));
            }
            '#' => {
                if terminated {
                    return Err(MarbleError::AfterTerminal);
                }
                terminated = true;
                out.push((at, Notification::Error(error.clone())));
            }
            c if c.is_ascii_alphanumeric() => {
                if terminated {
                    return Err(MarbleError::AfterTerminal);
                }
                let value = values
                    .iter()
                    .find(|(key, _)| *key == c)
                    .map(|(_, value)| value.clone())
                    .ok_or(MarbleError::UnknownValue(c))?;
                out.push((at, Notification::Value(value)));
            }
            c => return Err(MarbleError::UnexpectedChar(c)),
        }
        frame += 1;
    }

    if group_start.is_some() {
        return Err(MarbleError::UnclosedGroup);
    }

    let zero = zero.unwrap_or(0);
    Ok(out
        .into_iter()
        .map(|(at, notification)| (at - zero, notification))
        .collect())
}

/// One subscription window: when it was opened, and when (if ever) it was
/// closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionWindow {
    /// Frame at which the subscription was opened.
    pub subscribed_at: u64,
    /// Frame at which it ended (cancellation or terminal delivery), if it
    /// did.
    pub unsubscribed_at: Option<u64>,
}

/// Parse a subscription diagram (`^` subscribe, `!` unsubscribe).
pub fn parse_subscription_marbles(diagram: &str) -> Result<SubscriptionWindow, MarbleError> {
    let mut frame: u64 = 0;
    let mut subscribed_at: Option<u64> = None;
    let mut unsubscribed_at: Option<u64> = None;

    for ch in diagram.chars() {
        match ch {
            ' ' => continue,
            '-' => {}
            '^' => {
                if subscribed_at.is_some() {
                    return Err(MarbleError::DuplicateSubscribePoint);
                }
                subscribed_at = Some(frame);
            }
            '!' => {
                if unsubscribed_at.is_some() {
                    return Err(MarbleError::DuplicateUnsubscribePoint);
                }
                unsubscribed_at = Some(frame);
            }
            c => return Err(MarbleError::UnexpectedChar(c)),
        }
        frame += 1;
    }

    let subscribed_at = subscribed_at.ok_or(MarbleError::MissingSubscribePoint)?;
    Ok(SubscriptionWindow {
        subscribed_at,
        unsubscribed_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_and_frames() {
        let parsed = parse_marbles("a--b-|", &[('a', 1), ('b', 2)]).unwrap();
        assert_eq!(
            parsed,
            vec![
                (0, Notification::Value(1)),
                (3, Notification::Value(2)),
                (5, Notification::Complete),
            ]
        );
    }

    #[test]
    fn spaces_are_ignored() {
        let spaced = parse_marbles(" a -b | ", &[('a', 1), ('b', 2)]).unwrap();
        let dense = parse_marbles("a-b|", &[('a', 1), ('b', 2)]).unwrap();
        assert_eq!(spaced, dense);
    }

    #[test]
    fn error_marble_uses_supplied_failure() {
        let parsed = parse_marbles_with_error(
            "-#",
            &Vec::<(char, i32)>::new(),
            StreamError::source("feed down"),
        )
        .unwrap();
        assert_eq!(
            parsed,
            vec![(1, Notification::Error(StreamError::source("feed down")))]
        );
    }

    #[test]
    fn group_places_notifications_on_one_frame() {
        let parsed = parse_marbles("--(ab|)", &[('a', 1), ('b', 2)]).unwrap();
        assert_eq!(
            parsed,
            vec![
                (2, Notification::Value(1)),
                (2, Notification::Value(2)),
                (2, Notification::Complete),
            ]
        );
    }

    #[test]
    fn group_still_occupies_frames() {
        let parsed = parse_marbles("(a)b", &[('a', 1), ('b', 2)]).unwrap();
        assert_eq!(
            parsed,
            vec![(0, Notification::Value(1)), (3, Notification::Value(2))]
        );
    }

    #[test]
    fn subscription_point_shifts_frames() {
        let parsed = parse_marbles("a^b", &[('a', 1), ('b', 2)]).unwrap();
        assert_eq!(
            parsed,
            vec![(-1, Notification::Value(1)), (1, Notification::Value(2))]
        );
    }

    #[test]
    fn unknown_value_is_rejected() {
        let err = parse_marbles("a", &Vec::<(char, i32)>::new()).unwrap_err();
        assert_eq!(err, MarbleError::UnknownValue('a'));
    }

    #[test]
    fn notification_after_terminal_is_rejected() {
        let err = parse_marbles("|a", &[('a', 1)]).unwrap_err();
        assert_eq!(err, MarbleError::AfterTerminal);
    }

    #[test]
    fn unclosed_group_is_rejected() {
        let err = parse_marbles("(a", &[('a', 1)]).unwrap_err();
        assert_eq!(err, MarbleError::UnclosedGroup);
    }

    #[test]
    fn stray_group_close_is_rejected() {
        let err = parse_marbles(")", &Vec::<(char, i32)>::new()).unwrap_err();
        assert_eq!(err, MarbleError::UnmatchedGroupClose);
    }

    #[test]
    fn subscription_window_parses() {
        let window = parse_subscription_marbles("^--!").unwrap();
        assert_eq!(
            window,
            SubscriptionWindow {
                subscribed_at: 0,
                unsubscribed_at: Some(3),
            }
        );
    }

    #[test]
    fn open_ended_subscription_window() {
        let window = parse_subscription_marbles("--^").unwrap();
        assert_eq!(
            window,
            SubscriptionWindow {
                subscribed_at: 2,
                unsubscribed_at: None,
            }
        );
    }

    #[test]
    fn subscription_diagram_requires_subscribe_point() {
        let err = parse_subscription_marbles("--!").unwrap_err();
        assert_eq!(err, MarbleError::MissingSubscribePoint);
    }

    #[test]
    fn duplicate_unsubscribe_point_is_rejected() {
        let err = parse_subscription_marbles("^-!-!").unwrap_err();
        assert_eq!(err, MarbleError::DuplicateUnsubscribePoint);
    }
}
