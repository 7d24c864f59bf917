//! Unit tests for the protocol loop and session supervision.


use std::cell::Cell;
use std::io::{self, BufReader, Cursor, Read, Write};

use driver_config::Config;
use driver_protocol::{DriverIdentity, DriverResponse, ResponseStatus};
use rstest::rstest;
use serde_json::{Value, json};
use thiserror::Error;

use crate::{
    DriverError, JAVA_DRIVER, ParsingCollaborator, ServeSummary, Session, SessionEnd,
    SessionFault, SessionState, Supervisor, run,
};

const IDENTITY: DriverIdentity = DriverIdentity {
    driver_version: "9.9.9",
    language_name: "Scripted",
    language_version: "1",
};

#[derive(Debug, Error)]
#[error("{0}")]
struct ScriptedError(&'static str);

/// Collaborator whose behaviour is selected by markers in the source text.
struct ScriptedCollaborator;

impl ParsingCollaborator for ScriptedCollaborator {
    type Tree = String;
    type Portable = Value;
    type ParseError = ScriptedError;
    type ConvertError = ScriptedError;

    fn parse(&mut self, source: &str) -> Result<String, ScriptedError> {
        if source.contains("FAIL_PARSE") {
            return Err(ScriptedError("unbalanced braces"));
        }
        Ok(source.to_owned())
    }

    fn to_portable_tree(&self, tree: &String) -> Result<Value, ScriptedError> {
        if tree.contains("FAIL_CONVERT") {
            return Err(ScriptedError("tree too deep"));
        }
        Ok(json!({"type": "program", "token": tree}))
    }
}

struct BrokenSink;

impl Write for BrokenSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
    }
}

/// Fails the first read, then serves `data`.
struct FlakyReader {
    failed: bool,
    data: Cursor<Vec<u8>>,
}

impl FlakyReader {
    fn new(data: &[u8]) -> Self {
        Self {
            failed: false,
            data: Cursor::new(data.to_vec()),
        }
    }
}

impl Read for FlakyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.failed {
            return self.data.read(buf);
        }
        self.failed = true;
        Err(io::Error::other("stdin hiccup"))
    }
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("is a directory"))
    }
}

fn responses(output: &[u8]) -> Vec<DriverResponse<Value>> {
    serde_json::Deserializer::from_slice(output)
        .into_iter::<DriverResponse<Value>>()
        .collect::<Result<_, _>>()
        .expect("responses should be well-formed JSON")
}

fn serve_scripted(input: &str) -> (ServeSummary, Vec<DriverResponse<Value>>) {
    let mut reader = BufReader::new(Cursor::new(input.as_bytes().to_vec()));
    let mut output = Vec::new();
    let mut supervisor = Supervisor::new(IDENTITY, || Ok::<_, ScriptedError>(ScriptedCollaborator));
    let summary = supervisor
        .serve(&mut reader, &mut output)
        .expect("serving should succeed");
    (summary, responses(&output))
}

fn serve_java(input: &str) -> Vec<DriverResponse<Value>> {
    let mut reader = BufReader::new(Cursor::new(input.as_bytes().to_vec()));
    let mut output = Vec::new();
    run(&mut reader, &mut output, &Config::builtin()).expect("serving should succeed");
    responses(&output)
}

// ---------------------------------------------------------------------------
// End-to-end scenarios with the Java collaborator
// ---------------------------------------------------------------------------

#[test]
fn well_formed_class_is_answered_with_a_tree() {
    let answers = serve_java(r#"{"content":"class X{}"}"#);

    let [answer] = answers.as_slice() else {
        panic!("expected one response, got {answers:?}");
    };
    assert_eq!(answer.status(), ResponseStatus::Ok);
    assert!(answer.errors().is_empty());
    let ast = answer.ast().expect("ast present");
    assert_eq!(ast["type"], "program");
    assert_eq!(answer.driver_version(), JAVA_DRIVER.driver_version);
    assert_eq!(answer.language_name(), "Java");
    assert_eq!(answer.language_version(), "8");
}

#[test]
fn malformed_input_is_answered_with_a_decode_fault() {
    let answers = serve_java("not-json");

    let [answer] = answers.as_slice() else {
        panic!("expected one response, got {answers:?}");
    };
    assert_eq!(answer.status(), ResponseStatus::Fatal);
    assert!(answer.ast().is_none());
    let [kind, message] = answer.errors() else {
        panic!("expected two error strings, got {:?}", answer.errors());
    };
    assert_eq!(kind, std::any::type_name::<serde_json::Error>());
    assert!(message.starts_with("Error reading the petition: "));
}

#[test]
fn unbalanced_class_is_answered_with_a_parse_fault() {
    let answers = serve_java(r#"{"content":"class X{"}"#);

    let [answer] = answers.as_slice() else {
        panic!("expected one response, got {answers:?}");
    };
    assert_eq!(answer.status(), ResponseStatus::Fatal);
    assert!(answer.ast().is_none());
    let message = answer.errors().get(1).expect("message");
    assert!(message.starts_with("A problem occurred while processing the petition: "));
}

#[test]
fn identical_requests_in_fresh_sessions_get_identical_answers() {
    let request = r#"{"content":"class A { int f() { return 1; } }"}"#;
    assert_eq!(serve_java(request), serve_java(request));
}

#[test]
fn base64_request_is_decoded_before_parsing() {
    let answers = serve_java(r#"{"content":"Y2xhc3MgWHt9","encoding":"BASE64"}"#);
    let [answer] = answers.as_slice() else {
        panic!("expected one response, got {answers:?}");
    };
    assert_eq!(answer.status(), ResponseStatus::Ok);
}

// ---------------------------------------------------------------------------
// Supervision and sequencing
// ---------------------------------------------------------------------------

#[test]
fn back_to_back_requests_are_answered_in_order() {
    let (summary, answers) =
        serve_scripted(r#"{"content":"first"}{"content":"second"}"#);

    let tokens: Vec<&Value> = answers
        .iter()
        .map(|answer| &answer.ast().expect("ast")["token"])
        .collect();
    assert_eq!(tokens, [&json!("first"), &json!("second")]);
    assert_eq!(
        summary,
        ServeSummary {
            sessions: 1,
            responses: 2,
            halts: 0,
        }
    );
}

#[rstest]
#[case::parse(r#"{"content":"FAIL_PARSE"}"#, "A problem occurred while processing the petition: unbalanced braces")]
#[case::convert(r#"{"content":"FAIL_CONVERT"}"#, "Error serializing the AST to JSON: tree too deep")]
fn collaborator_faults_produce_one_fatal_response(#[case] input: &str, #[case] expected: &str) {
    let (summary, answers) = serve_scripted(input);

    let [answer] = answers.as_slice() else {
        panic!("expected one response, got {answers:?}");
    };
    assert_eq!(answer.status(), ResponseStatus::Fatal);
    assert_eq!(
        answer.errors(),
        [std::any::type_name::<ScriptedError>().to_owned(), expected.to_owned()]
    );
    assert_eq!(summary.halts, 1);
}

#[test]
fn request_after_parse_fault_is_served_by_a_new_session() {
    let (summary, answers) =
        serve_scripted(r#"{"content":"FAIL_PARSE"} {"content":"recovered"}"#);

    let statuses: Vec<ResponseStatus> = answers.iter().map(DriverResponse::status).collect();
    assert_eq!(statuses, [ResponseStatus::Fatal, ResponseStatus::Ok]);
    assert_eq!(summary.sessions, 2);
    assert_eq!(summary.halts, 1);
}

#[test]
fn garbage_before_a_request_gets_one_fault_then_the_request_is_served() {
    let (summary, answers) = serve_scripted(r#"not-json {"content":"after"}"#);

    let statuses: Vec<ResponseStatus> = answers.iter().map(DriverResponse::status).collect();
    assert_eq!(statuses, [ResponseStatus::Fatal, ResponseStatus::Ok]);
    assert_eq!(summary.sessions, 2);
    assert_eq!(summary.halts, 1);
}

#[test]
fn garbage_larger_than_the_read_buffer_gets_exactly_one_reply() {
    let (summary, answers) = serve_scripted(&"x".repeat(20_000));

    assert_eq!(answers.len(), 1);
    assert_eq!(answers.first().map(DriverResponse::status), Some(ResponseStatus::Fatal));
    assert_eq!(summary.sessions, 2);
    assert_eq!(summary.halts, 1);
}

#[rstest]
#[case::missing_field(String::from(r#"{"source":"x"}"#))]
#[case::large_wrong_type(format!(r#"{{"content":1,"pad":"{}"}}"#, "a".repeat(20_000)))]
fn request_after_a_schema_fault_is_still_answered(#[case] rejected: String) {
    let input = format!(r#"{rejected}{{"content":"next"}}"#);
    let (summary, answers) = serve_scripted(&input);

    let statuses: Vec<ResponseStatus> = answers.iter().map(DriverResponse::status).collect();
    assert_eq!(statuses, [ResponseStatus::Fatal, ResponseStatus::Ok]);
    let token = answers
        .get(1)
        .and_then(DriverResponse::ast)
        .map(|ast| ast["token"].clone());
    assert_eq!(token, Some(json!("next")));
    assert_eq!(summary.sessions, 2);
}

#[test]
fn transient_read_failure_is_reported_and_serving_resumes() {
    let mut reader = BufReader::new(FlakyReader::new(br#"{"content":"after"}"#));
    let mut output = Vec::new();
    let mut supervisor = Supervisor::new(IDENTITY, || Ok::<_, ScriptedError>(ScriptedCollaborator));

    let summary = supervisor.serve(&mut reader, &mut output).expect("serve");
    let answers = responses(&output);

    let [failure, answer] = answers.as_slice() else {
        panic!("expected two responses, got {answers:?}");
    };
    assert_eq!(failure.status(), ResponseStatus::Fatal);
    let [kind, message] = failure.errors() else {
        panic!("expected two error strings, got {:?}", failure.errors());
    };
    assert_eq!(kind, std::any::type_name::<serde_json::Error>());
    assert!(message.starts_with("A problem occurred while processing the petition: "));
    assert_eq!(answer.status(), ResponseStatus::Ok);
    assert_eq!(summary.halts, 1);
}

#[test]
fn persistent_read_failure_stops_serving_after_one_reply() {
    let mut reader = BufReader::new(FailingReader);
    let mut output = Vec::new();
    let mut supervisor = Supervisor::new(IDENTITY, || Ok::<_, ScriptedError>(ScriptedCollaborator));

    let error = supervisor
        .serve(&mut reader, &mut output)
        .expect_err("an unreadable input is fatal");

    assert!(matches!(error, DriverError::Read { .. }));
    let answers = responses(&output);
    assert_eq!(answers.len(), 1);
    assert_eq!(answers.first().map(DriverResponse::status), Some(ResponseStatus::Fatal));
}

#[test]
fn every_session_gets_a_fresh_collaborator() {
    let built = Cell::new(0_u32);
    let mut reader = BufReader::new(Cursor::new(
        br#"{"content":"FAIL_PARSE"}{"content":"FAIL_PARSE"}{"content":"ok"}"#.to_vec(),
    ));
    let mut output = Vec::new();
    let mut supervisor = Supervisor::new(IDENTITY, || {
        built.set(built.get() + 1);
        Ok::<_, ScriptedError>(ScriptedCollaborator)
    });

    let summary = supervisor.serve(&mut reader, &mut output).expect("serve");
    assert_eq!(summary.sessions, 3);
    assert_eq!(built.get(), 3);
    assert_eq!(responses(&output).len(), 3);
}

#[test]
fn empty_input_stops_without_responses() {
    let (summary, answers) = serve_scripted("");
    assert!(answers.is_empty());
    assert_eq!(summary.sessions, 1);
    assert_eq!(summary.responses, 0);
}

#[test]
fn broken_output_stops_serving() {
    let built = Cell::new(0_u32);
    let mut reader = BufReader::new(Cursor::new(
        br#"{"content":"a"}{"content":"b"}"#.to_vec(),
    ));
    let mut supervisor = Supervisor::new(IDENTITY, || {
        built.set(built.get() + 1);
        Ok::<_, ScriptedError>(ScriptedCollaborator)
    });

    let error = supervisor
        .serve(&mut reader, &mut BrokenSink)
        .expect_err("a broken sink is fatal");
    assert!(matches!(error, DriverError::Write { .. }));
    assert_eq!(built.get(), 1);
}

#[test]
fn broken_output_is_fatal_even_for_fault_responses() {
    let mut reader = BufReader::new(Cursor::new(b"not-json".to_vec()));
    let mut supervisor = Supervisor::new(IDENTITY, || Ok::<_, ScriptedError>(ScriptedCollaborator));

    let error = supervisor
        .serve(&mut reader, &mut BrokenSink)
        .expect_err("a broken sink is fatal");
    assert!(matches!(error, DriverError::Write { .. }));
}

#[test]
fn collaborator_construction_failure_is_fatal() {
    let mut reader = BufReader::new(Cursor::new(Vec::new()));
    let mut output = Vec::new();
    let mut supervisor = Supervisor::new(IDENTITY, || {
        Err::<ScriptedCollaborator, _>(ScriptedError("grammar ABI mismatch"))
    });

    let error = supervisor
        .serve(&mut reader, &mut output)
        .expect_err("construction failure is fatal");
    assert!(matches!(error, DriverError::ParserInit { .. }));
    assert!(output.is_empty());
}

// ---------------------------------------------------------------------------
// Session state machine
// ---------------------------------------------------------------------------

#[test]
fn session_returns_to_idle_when_input_closes() {
    let mut output = Vec::new();
    let mut session = Session::new(
        Cursor::new(br#"{"content":"a"}"#.to_vec()),
        &mut output,
        ScriptedCollaborator,
        IDENTITY,
    );

    assert_eq!(session.state(), SessionState::Idle);
    let end = session.run().expect("run");
    assert_eq!(end, SessionEnd::InputClosed);
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.responses(), 1);
}

#[test]
fn session_halts_after_reporting_a_fault() {
    let mut output = Vec::new();
    let mut session = Session::new(
        Cursor::new(br#"{"content":"FAIL_PARSE"}{"content":"never read"}"#.to_vec()),
        &mut output,
        ScriptedCollaborator,
        IDENTITY,
    );

    let end = session.run().expect("run");
    assert!(matches!(end, SessionEnd::Halted(SessionFault::Parse { .. })));
    assert_eq!(session.state(), SessionState::Halted);
    assert_eq!(session.responses(), 1);
}
