//! Turns [`TrestleError`] into reports miette can render.
//!
//! A parse failure may carry several diagnostics; each becomes its own
//! report with the grammar source attached so miette can print snippets.
//! Every other error becomes a single report with a code and, where the
//! fix is usually the same, a hint.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceCode, SourceSpan};

use trestle::TrestleError;
use trestle_parser::{Span, error::Diagnostic};

/// One renderable problem.
#[derive(Debug)]
pub enum Report<'a> {
    /// A located problem in the grammar source.
    Grammar { diag: &'a Diagnostic, src: &'a str },
    /// A failure that has no position in the grammar.
    Failure(&'a TrestleError),
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Grammar { diag, .. } => f.write_str(diag.message()),
            Report::Failure(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for Report<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Report::Grammar { .. } => None,
            Report::Failure(err) => err.source(),
        }
    }
}

impl MietteDiagnostic for Report<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Report::Grammar { diag, .. } => diag
                .code()
                .map(|code| Box::new(code) as Box<dyn fmt::Display>),
            Report::Failure(err) => {
                failure_code(err).map(|code| Box::new(code) as Box<dyn fmt::Display>)
            }
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Report::Grammar { diag, .. } => diag
                .help()
                .map(|help| Box::new(help) as Box<dyn fmt::Display>),
            Report::Failure(err) => {
                failure_help(err).map(|help| Box::new(help) as Box<dyn fmt::Display>)
            }
        }
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        match self {
            Report::Grammar { src, .. } => Some(src as &dyn SourceCode),
            Report::Failure(_) => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let Report::Grammar { diag, .. } = self else {
            return None;
        };
        if diag.labels().is_empty() {
            return None;
        }
        Some(Box::new(diag.labels().iter().map(|label| {
            let span = source_span(label.span());
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

fn failure_code(err: &TrestleError) -> Option<&'static str> {
    let code = match err {
        TrestleError::Io(_) => "trestle::io",
        TrestleError::Parse { .. } => return None,
        TrestleError::Build(_) => "trestle::build",
        TrestleError::Lookup(_) => "trestle::lookup",
        TrestleError::Geometry(_) => "trestle::geometry",
        TrestleError::Config(_) => "trestle::config",
        TrestleError::Export(_) => "trestle::export",
    };
    Some(code)
}

fn failure_help(err: &TrestleError) -> Option<&'static str> {
    match err {
        TrestleError::Io(_) => {
            Some("check that the input exists and the output directory is writable")
        }
        TrestleError::Lookup(_) => Some("only productions defined in the grammar can be drawn"),
        TrestleError::Config(_) => {
            Some("check the TOML syntax; colors accept CSS names or hex values such as `#336699`")
        }
        _ => None,
    }
}

fn source_span(span: Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Splits an error into the reports to print, one per parse diagnostic.
pub fn to_reports(err: &TrestleError) -> Vec<Report<'_>> {
    match err {
        TrestleError::Parse { err: parse, src } => parse
            .diagnostics()
            .iter()
            .map(|diag| Report::Grammar {
                diag,
                src: src.as_str(),
            })
            .collect(),
        _ => vec![Report::Failure(err)],
    }
}

#[cfg(test)]
mod tests {
    use trestle_parser::error::{ErrorCode, ParseError};

    use super::*;

    #[test]
    fn test_each_diagnostic_is_reported() {
        let diags = vec![
            Diagnostic::error("unterminated string literal")
                .with_code(ErrorCode::E001)
                .with_label(Span::new(4..5), "literal starts here"),
            Diagnostic::error("incomplete input")
                .with_code(ErrorCode::E101)
                .with_label(Span::new(9..9), "input ends here")
                .with_help("end the production with `.` or `;`"),
        ];
        let err = TrestleError::new_parse_error(ParseError::new(diags), "a = \"b\n c =");

        let reports = to_reports(&err);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].to_string(), "unterminated string literal");
        assert_eq!(reports[1].to_string(), "incomplete input");
        assert_eq!(
            reports[1].code().map(|code| code.to_string()).as_deref(),
            Some("E101")
        );
        assert_eq!(
            reports[1].help().map(|help| help.to_string()).as_deref(),
            Some("end the production with `.` or `;`")
        );
        assert!(reports[0].source_code().is_some());
    }

    #[test]
    fn test_failure_has_code_and_hint() {
        let err = TrestleError::Lookup("expr".to_string());
        let reports = to_reports(&err);
        assert_eq!(reports.len(), 1);

        let report = &reports[0];
        assert!(matches!(report, Report::Failure(_)));
        assert_eq!(report.to_string(), "Symbol 'expr' not found");
        assert_eq!(
            report.code().map(|code| code.to_string()).as_deref(),
            Some("trestle::lookup")
        );
        assert!(report.help().is_some());
        assert!(report.source_code().is_none());
        assert!(report.labels().is_none());
    }

    #[test]
    fn test_config_failure_hints_at_color_syntax() {
        let err = TrestleError::Config("invalid color `reddish`".to_string());
        let help = to_reports(&err)[0].help().map(|help| help.to_string());
        assert!(help.is_some_and(|help| help.contains("CSS")));
    }

    #[test]
    fn test_labels_keep_primary_flag() {
        let diag = Diagnostic::error("group is never closed")
            .with_label(Span::new(12..12), "input ends here")
            .with_secondary_label(Span::new(4..5), "group opened here");
        let report = Report::Grammar {
            diag: &diag,
            src: "expr = ( a | b",
        };

        let labels: Vec<_> = report.labels().unwrap().collect();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].primary());
        assert_eq!(labels[1].label(), Some("group opened here"));
        assert!(!labels[1].primary());
    }
}
