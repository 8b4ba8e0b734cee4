#![cfg(all(unix, feature = "cli"))]

use std::fs::File;
use std::io::{Read, Write};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use std::thread;

use bytes::BytesMut;
use portworker::frame::{decode_frame, encode_frame, CorrelationId, Frame, MAX_PAYLOAD};
use portworker::payload::{self, Value};

const FAILURE: i32 = 1;
const TRANSPORT_ERROR: i32 = 3;
const DATA_INVALID: i32 = 60;
const USAGE: i32 = 64;

fn pipe() -> (OwnedFd, OwnedFd) {
    let mut fds = [0 as libc::c_int; 2];

    // Close-on-exec from the start so concurrently spawned workers never
    // inherit another test's pipe ends.
    #[cfg(target_os = "linux")]
    // SAFETY: `fds` has room for the two descriptors pipe2(2) writes.
    let rc = unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) };
    #[cfg(not(target_os = "linux"))]
    // SAFETY: `fds` has room for the two descriptors pipe(2) writes.
    let rc = unsafe {
        let rc = libc::pipe(fds.as_mut_ptr());
        if rc == 0 {
            libc::fcntl(fds[0], libc::F_SETFD, libc::FD_CLOEXEC);
            libc::fcntl(fds[1], libc::F_SETFD, libc::FD_CLOEXEC);
        }
        rc
    };

    assert_eq!(rc, 0, "pipe failed: {}", std::io::Error::last_os_error());
    // SAFETY: both descriptors were just created and are owned by nobody else.
    unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) }
}

/// Runs in the forked child: place `request`/`response` on the target fds.
fn wire_fds(request: RawFd, response: RawFd, targets: (RawFd, RawFd)) -> std::io::Result<()> {
    // SAFETY: plain descriptor-table operations on fds inherited from the parent.
    unsafe {
        // Move both sources above the targets first so neither dup2 clobbers the other.
        let request = libc::fcntl(request, libc::F_DUPFD_CLOEXEC, 10);
        let response = libc::fcntl(response, libc::F_DUPFD_CLOEXEC, 10);
        if request < 0 || response < 0 {
            return Err(std::io::Error::last_os_error());
        }
        if libc::dup2(request, targets.0) < 0 || libc::dup2(response, targets.1) < 0 {
            return Err(std::io::Error::last_os_error());
        }
    }
    Ok(())
}

struct WorkerRun {
    code: Option<i32>,
    responses: Vec<Frame>,
    stderr: String,
}

fn run_worker(input: Vec<u8>, args: &[&str]) -> WorkerRun {
    run_worker_on(input, args, (3, 4), &[])
}

fn run_worker_on(
    input: Vec<u8>,
    args: &[&str],
    targets: (RawFd, RawFd),
    env: &[(&str, &str)],
) -> WorkerRun {
    let (request_read, request_write) = pipe();
    let (response_read, response_write) = pipe();
    let child_request = request_read.as_raw_fd();
    let child_response = response_write.as_raw_fd();

    let mut command = Command::new(env!("CARGO_BIN_EXE_portworker"));
    command
        .args(args)
        .env("PORTWORKER_LOG_LEVEL", "error")
        .envs(env.iter().copied())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    // SAFETY: the closure only calls async-signal-safe fcntl/dup2.
    unsafe {
        command.pre_exec(move || wire_fds(child_request, child_response, targets));
    }

    let child = command.spawn().expect("worker should start");
    drop(request_read);
    drop(response_write);

    let writer = thread::spawn(move || {
        let mut requests = File::from(request_write);
        // The worker may exit before consuming everything (fault paths).
        let _ = requests.write_all(&input);
    });

    let mut output = Vec::new();
    File::from(response_read)
        .read_to_end(&mut output)
        .expect("response channel should be readable");
    writer.join().expect("writer thread should finish");

    let finished = child.wait_with_output().expect("worker should exit");

    let mut wire = BytesMut::from(output.as_slice());
    let mut responses = Vec::new();
    while let Some(frame) = decode_frame(&mut wire, MAX_PAYLOAD).expect("valid response frame") {
        responses.push(frame);
    }
    assert!(wire.is_empty(), "partial response frame on the wire");

    WorkerRun {
        code: finished.status.code(),
        responses,
        stderr: String::from_utf8_lossy(&finished.stderr).into_owned(),
    }
}

fn push_request(wire: &mut Vec<u8>, id: [u8; 16], data: &Value) {
    let payload = payload::encode(data).expect("request should encode");
    let mut frame = BytesMut::new();
    encode_frame(&CorrelationId::from_bytes(id), &payload, &mut frame).expect("frame");
    wire.extend_from_slice(&frame);
}

fn decoded(frame: &Frame) -> Value {
    payload::decode(&frame.payload).expect("response payload should decode")
}

#[test]
fn answers_empty_request_with_forecast() {
    let mut input = Vec::new();
    push_request(&mut input, [0x01; 16], &Value::map());

    let run = run_worker(input, &["model-a", "v2"]);

    assert_eq!(run.code, Some(0), "stderr: {}", run.stderr);
    assert_eq!(run.responses.len(), 1);
    let response = &run.responses[0];
    assert_eq!(response.correlation_id.as_bytes(), &[0x01; 16]);
    assert_eq!(response.total_size(), 16 + response.payload.len());

    let expected = Value::map()
        .with("success", true)
        .with("prediction", "Partial clouds")
        .with(
            "based_on_input",
            Value::map()
                .with("id", vec![0x01u8; 16])
                .with("data", Value::map()),
        )
        .with(
            "context",
            Value::map().with(
                "init_arguments",
                vec![Value::from("model-a"), Value::from("v2")],
            ),
        );
    assert_eq!(decoded(response), expected);
}

#[test]
fn answers_each_request_in_order() {
    let ids: Vec<[u8; 16]> = (0u8..5).map(|n| [n.wrapping_mul(37); 16]).collect();
    let mut input = Vec::new();
    for (n, id) in ids.iter().enumerate() {
        push_request(&mut input, *id, &Value::map().with("n", n));
    }

    let run = run_worker(input, &[]);

    assert_eq!(run.code, Some(0), "stderr: {}", run.stderr);
    let got: Vec<[u8; 16]> = run
        .responses
        .iter()
        .map(|f| f.correlation_id.into_bytes())
        .collect();
    assert_eq!(got, ids);

    for (n, frame) in run.responses.iter().enumerate() {
        let value = decoded(frame);
        let echoed = value
            .get("based_on_input")
            .and_then(|input| input.get("data"))
            .and_then(|data| data.get("n"))
            .and_then(Value::as_u64);
        assert_eq!(echoed, Some(n as u64));
    }
}

#[test]
fn error_marker_yields_in_band_failure() {
    let data = Value::map().with("error", true);
    let mut input = Vec::new();
    push_request(&mut input, [0x02; 16], &data);

    let run = run_worker(input, &[]);

    assert_eq!(run.code, Some(0), "stderr: {}", run.stderr);
    let value = decoded(&run.responses[0]);
    assert_eq!(value.get("success"), Some(&Value::Bool(false)));
    assert_eq!(
        value.get("based_on_input"),
        Some(&Value::map().with("id", vec![0x02u8; 16]).with("data", data))
    );
}

#[test]
fn raise_marker_kills_worker_without_answering() {
    let mut input = Vec::new();
    push_request(&mut input, [0x0A; 16], &Value::map());
    push_request(&mut input, [0x0B; 16], &Value::map().with("raise", true));
    push_request(&mut input, [0x0C; 16], &Value::map());

    let run = run_worker(input, &[]);

    assert_eq!(run.code, Some(FAILURE));
    assert_eq!(run.responses.len(), 1);
    assert_eq!(run.responses[0].correlation_id.as_bytes(), &[0x0A; 16]);
    assert!(run.stderr.contains("foo-bar"), "stderr: {}", run.stderr);
}

#[test]
fn short_or_empty_input_is_clean_shutdown() {
    for len in 0..4 {
        let run = run_worker(vec![0u8; len], &[]);
        assert_eq!(run.code, Some(0), "{len} bytes, stderr: {}", run.stderr);
        assert!(run.responses.is_empty());
    }
}

#[test]
fn truncated_frame_is_a_data_error() {
    let mut input = Vec::new();
    push_request(&mut input, [0x03; 16], &Value::map().with("k", "v"));
    input.truncate(input.len() - 2);

    let run = run_worker(input, &[]);

    assert_eq!(run.code, Some(DATA_INVALID));
    assert!(run.responses.is_empty());
}

#[test]
fn channel_descriptors_come_from_environment() {
    let mut input = Vec::new();
    push_request(&mut input, [0x04; 16], &Value::map());

    let run = run_worker_on(
        input,
        &[],
        (7, 8),
        &[("PORTWORKER_REQUEST_FD", "7"), ("PORTWORKER_RESPONSE_FD", "8")],
    );

    assert_eq!(run.code, Some(0), "stderr: {}", run.stderr);
    assert_eq!(run.responses.len(), 1);
    assert_eq!(run.responses[0].correlation_id.as_bytes(), &[0x04; 16]);
}

#[test]
fn unavailable_channels_fail_fast() {
    let run = run_worker_on(
        Vec::new(),
        &[],
        (3, 4),
        &[("PORTWORKER_REQUEST_FD", "200"), ("PORTWORKER_RESPONSE_FD", "201")],
    );

    assert_eq!(run.code, Some(TRANSPORT_ERROR));
    assert!(run.stderr.contains("fd 200"), "stderr: {}", run.stderr);
}

#[test]
fn flag_like_arguments_reach_the_handler() {
    let mut input = Vec::new();
    push_request(&mut input, [0x05; 16], &Value::map());

    let run = run_worker(input, &["--log-level", "trace", "--help"]);

    assert_eq!(run.code, Some(0), "stderr: {}", run.stderr);
    let value = decoded(&run.responses[0]);
    assert_eq!(
        value.get("context"),
        Some(&Value::map().with(
            "init_arguments",
            vec![
                Value::from("--log-level"),
                Value::from("trace"),
                Value::from("--help"),
            ],
        ))
    );
}

#[test]
fn invalid_environment_setting_is_a_usage_error() {
    let run = run_worker_on(Vec::new(), &[], (3, 4), &[("PORTWORKER_LOG_FORMAT", "yaml")]);

    assert_eq!(run.code, Some(USAGE));
    assert!(run.responses.is_empty());
    assert!(run.stderr.contains("yaml"), "stderr: {}", run.stderr);
}

#[test]
fn non_map_request_data_kills_worker() {
    let mut input = Vec::new();
    push_request(&mut input, [0x06; 16], &Value::Array(vec![Value::from("raise")]));

    let run = run_worker(input, &[]);

    assert_eq!(run.code, Some(FAILURE));
    assert!(run.responses.is_empty());
    assert!(run.stderr.contains("must be a map"), "stderr: {}", run.stderr);
}

#[test]
fn non_utf8_string_payload_is_a_data_error() {
    let mut frame = BytesMut::new();
    encode_frame(&CorrelationId::from_bytes([0x07; 16]), &[0xA2, 0xFF, 0xFE], &mut frame)
        .expect("frame");

    let run = run_worker(frame.to_vec(), &[]);

    assert_eq!(run.code, Some(DATA_INVALID));
    assert!(run.responses.is_empty());
}
