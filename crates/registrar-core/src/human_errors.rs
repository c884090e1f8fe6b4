// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the capture screens.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity drives how the alert is presented.

use crate::error::{ExportError, PageFailureKind, RegistrarError, TransportError};
use crate::types::REQUIRED_PAGE_COUNT;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Network blip, timeout — retrying the upload may work.
    Transient,
    /// User must do something (rescan a page, remove an extra page).
    ActionRequired,
    /// Cannot be fixed by retrying or rescanning.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether offering a Retry button makes sense.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `RegistrarError` into a `HumanError` for the alert dialog.
pub fn humanize_error(err: &RegistrarError) -> HumanError {
    match err {
        RegistrarError::Export(export) => humanize_export_error(export),
        RegistrarError::Transport(transport) => humanize_transport_error(transport),

        RegistrarError::DocumentNotFound(id) => HumanError {
            message: "We couldn't find that scan.".into(),
            suggestion: format!("Start a new scan and try again. (Document: {id})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        RegistrarError::Scanner(detail) => HumanError {
            message: "The scanner had a problem.".into(),
            suggestion: format!("Check the licence key in Settings, then try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        other => HumanError {
            message: "Something went wrong.".into(),
            suggestion: format!("Check your settings and files, or report this problem. (Detail: {other})"),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}

/// Map an export failure to the alert the capture screen shows.
pub fn humanize_export_error(err: &ExportError) -> HumanError {
    match err {
        ExportError::WrongPageCount(count) if *count < REQUIRED_PAGE_COUNT => HumanError {
            message: "The document needs two pages (front and back).".into(),
            suggestion: "Scan the missing side, then export again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        ExportError::WrongPageCount(_) => HumanError {
            message: "The document has more than two pages.".into(),
            suggestion: "Keep only the front and the back, then export again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        ExportError::PageFailures(failures) => {
            let all_missing = failures
                .iter()
                .all(|failure| failure.kind == PageFailureKind::MissingSource);
            let lines: Vec<String> = failures.iter().map(ToString::to_string).collect();
            HumanError {
                message: "Some pages could not be processed.".into(),
                suggestion: if all_missing {
                    format!("Rescan these pages:\n{}", lines.join("\n"))
                } else {
                    format!("Try rescanning:\n{}", lines.join("\n"))
                },
                retriable: false,
                severity: Severity::ActionRequired,
            }
        }
        ExportError::Internal(detail) => HumanError {
            message: "The export could not be completed.".into(),
            suggestion: format!("Please report this problem. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },
        ExportError::Transport(transport) => humanize_transport_error(transport),
    }
}

fn humanize_transport_error(err: &TransportError) -> HumanError {
    if err.is_transient() {
        HumanError {
            message: "We couldn't reach the records server.".into(),
            suggestion: "Check your connection and tap Retry. Your scan is kept.".into(),
            retriable: true,
            severity: Severity::Transient,
        }
    } else {
        HumanError {
            message: "The records server rejected the request.".into(),
            suggestion: format!("Check the server address in Settings. ({err})"),
            retriable: false,
            severity: Severity::Permanent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PageFailure;
    use crate::types::PageLabel;

    #[test]
    fn too_few_pages_asks_for_missing_side() {
        let human = humanize_export_error(&ExportError::WrongPageCount(1));
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.message.contains("two pages"));
    }

    #[test]
    fn too_many_pages_asks_to_remove() {
        let human = humanize_export_error(&ExportError::WrongPageCount(3));
        assert!(human.message.contains("more than two"));
    }

    #[test]
    fn page_failures_list_every_page() {
        let err = ExportError::PageFailures(vec![
            PageFailure::missing_source(PageLabel::Front, "a"),
            PageFailure::missing_source(PageLabel::Back, "b"),
        ]);
        let human = humanize_export_error(&err);
        assert!(human.suggestion.contains("Front page (a)"));
        assert!(human.suggestion.contains("Back page (b)"));
    }

    #[test]
    fn connection_failure_is_retriable() {
        let err = RegistrarError::Transport(TransportError::Connect("refused".into()));
        let human = humanize_error(&err);
        assert!(human.retriable);
        assert_eq!(human.severity, Severity::Transient);
    }

    #[test]
    fn unclassified_errors_are_not_offered_a_retry() {
        let errors = [
            RegistrarError::Config("bad url".into()),
            RegistrarError::Io(std::io::Error::other("disk full")),
        ];
        for err in &errors {
            let human = humanize_error(err);
            assert!(!human.retriable, "{err}");
            assert_eq!(human.severity, Severity::Permanent);
        }
    }

    #[test]
    fn rejected_upload_is_permanent() {
        let err = ExportError::Transport(TransportError::Status {
            status: 422,
            url: "http://host/documents/submit".into(),
        });
        let human = humanize_export_error(&err);
        assert!(!human.retriable);
        assert_eq!(human.severity, Severity::Permanent);
    }
}
