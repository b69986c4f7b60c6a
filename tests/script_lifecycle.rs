mod common;
use crate::common::{RecordingClient, StopCounter, init_tracing, with_timeout, wsl_instance};

use std::time::Duration;

use mudscript::client::{MessageStyle, SCRIPTING_OFF, SCRIPTING_ON};
use mudscript::types::ScriptStatus;

const LOOP: &str = "top:\nput ping\npause 0.05\ngoto top\n";

#[tokio::test]
async fn test_script_runs_to_end_and_reports() {
    init_tracing();

    let client = RecordingClient::new();
    let stops = StopCounter::new();
    let instance = wsl_instance("greet", "put wave\necho hello %1\n");
    assert_eq!(instance.status(), ScriptStatus::NotStarted);

    instance.start(client.as_client(), "world", stops.on_stop());
    with_timeout(instance.join()).await;

    assert_eq!(instance.status(), ScriptStatus::Stopped);
    assert_eq!(stops.count(), 1);
    assert_eq!(client.commands(), vec!["wave".to_string()]);
    assert_eq!(
        client.directives(),
        vec![SCRIPTING_ON.to_string(), SCRIPTING_OFF.to_string()]
    );

    let texts = client.message_texts();
    assert_eq!(texts, vec!["hello world", "Script \"greet\" ended"]);
}

#[tokio::test]
async fn test_exit_ends_script_normally() {
    init_tracing();

    let client = RecordingClient::new();
    let instance = wsl_instance("early", "echo one\nexit\necho two\n");
    instance.start(client.as_client(), "", StopCounter::new().on_stop());
    with_timeout(instance.join()).await;

    assert_eq!(
        client.message_texts(),
        vec!["one", "Script \"early\" ended"]
    );
}

#[tokio::test]
async fn test_parse_error_stops_script_and_restores_scripting_mode() {
    init_tracing();

    let client = RecordingClient::new();
    let stops = StopCounter::new();
    let instance = wsl_instance("broken", "put look\nbogus thing\n");
    instance.start(client.as_client(), "", stops.on_stop());
    with_timeout(instance.join()).await;

    assert_eq!(instance.status(), ScriptStatus::Stopped);
    assert_eq!(stops.count(), 1);
    assert!(client.commands().is_empty(), "nothing runs when parsing fails");
    assert_eq!(
        client.directives(),
        vec![SCRIPTING_ON.to_string(), SCRIPTING_OFF.to_string()]
    );

    let messages = client.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].style, MessageStyle::Error);
    assert_eq!(
        messages[0].text,
        "Parse error on line 2: unknown command 'bogus'"
    );
}

#[tokio::test]
async fn test_runtime_fault_stops_script() {
    init_tracing();

    let client = RecordingClient::new();
    let stops = StopCounter::new();
    let instance = wsl_instance("faulty", "put one\necho %missing\nput two\n");
    instance.start(client.as_client(), "", stops.on_stop());
    with_timeout(instance.join()).await;

    assert_eq!(stops.count(), 1);
    assert_eq!(client.commands(), vec!["one".to_string()]);
    assert_eq!(
        client.message_texts(),
        vec!["Script error: undefined variable 'missing'"]
    );
    assert_eq!(client.directives().last().map(String::as_str), Some(SCRIPTING_OFF));
}

#[tokio::test]
async fn test_client_failure_is_a_fault() {
    init_tracing();

    let client = RecordingClient::new();
    client.fail_commands();
    let stops = StopCounter::new();
    let instance = wsl_instance("offline", "put look\n");
    instance.start(client.as_client(), "", stops.on_stop());
    with_timeout(instance.join()).await;

    assert_eq!(stops.count(), 1);
    let texts = client.message_texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].starts_with("Script error: client error:"), "{texts:?}");
}

#[tokio::test]
async fn test_panicking_client_still_cleans_up() {
    init_tracing();

    let client = RecordingClient::new();
    client.panic_on_commands();
    let stops = StopCounter::new();
    let instance = wsl_instance("fragile", "echo before
put look
echo after
");
    instance.start(client.as_client(), "", stops.on_stop());
    with_timeout(instance.join()).await;

    assert_eq!(instance.status(), ScriptStatus::Stopped);
    assert_eq!(stops.count(), 1);
    assert!(client.commands().is_empty());
    assert_eq!(
        client.directives(),
        vec![SCRIPTING_ON.to_string(), SCRIPTING_OFF.to_string()]
    );

    let texts = client.message_texts();
    assert_eq!(texts.len(), 2, "{texts:?}");
    assert_eq!(texts[0], "before");
    assert!(
        texts[1].starts_with("Script error: execution task panicked: connection handler blew up"),
        "{texts:?}"
    );
}

#[tokio::test]
async fn test_stop_while_running_cancels_pause() {
    init_tracing();

    let client = RecordingClient::new();
    let stops = StopCounter::new();
    let instance = wsl_instance("sleepy", "put a\npause 60\nput b\n");
    instance.start(client.as_client(), "", stops.on_stop());

    with_timeout(client.wait_for_commands(1)).await;
    assert_eq!(instance.status(), ScriptStatus::Running);

    instance.stop();
    with_timeout(instance.join()).await;

    assert_eq!(instance.status(), ScriptStatus::Stopped);
    assert_eq!(stops.count(), 1);
    assert_eq!(client.commands(), vec!["a".to_string()]);
    assert!(
        client.message_texts().is_empty(),
        "a stopped script prints no end message"
    );
    assert_eq!(client.directives().last().map(String::as_str), Some(SCRIPTING_OFF));
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    init_tracing();

    let client = RecordingClient::new();
    let stops = StopCounter::new();
    let instance = wsl_instance("loop", LOOP);
    instance.start(client.as_client(), "", stops.on_stop());
    with_timeout(client.wait_for_commands(1)).await;

    instance.stop();
    instance.stop();
    with_timeout(instance.join()).await;
    instance.stop();

    assert_eq!(stops.count(), 1);
    assert_eq!(instance.status(), ScriptStatus::Stopped);
}

#[tokio::test]
async fn test_stop_before_start_only_runs_on_stop() {
    init_tracing();

    let client = RecordingClient::new();
    let stops = StopCounter::new();
    let instance = wsl_instance("never", "put look\n");

    instance.stop();
    assert_eq!(instance.status(), ScriptStatus::Stopped);

    instance.start(client.as_client(), "", stops.on_stop());
    with_timeout(instance.join()).await;

    assert_eq!(stops.count(), 1);
    assert!(client.events().is_empty(), "no statement ran: {:?}", client.events());
}

#[tokio::test]
async fn test_second_start_is_ignored() {
    init_tracing();

    let client = RecordingClient::new();
    let first = StopCounter::new();
    let second = StopCounter::new();
    let instance = wsl_instance("once", "put look\npause 0.2\n");

    instance.start(client.as_client(), "", first.on_stop());
    instance.start(client.as_client(), "", second.on_stop());
    with_timeout(instance.join()).await;

    assert_eq!(first.count(), 1);
    assert_eq!(second.count(), 0);
    assert_eq!(client.commands(), vec!["look".to_string()]);
}

#[tokio::test]
async fn test_suspend_blocks_until_resume() {
    init_tracing();

    let client = RecordingClient::new();
    let instance = wsl_instance("loop", LOOP);
    instance.start(client.as_client(), "", StopCounter::new().on_stop());
    with_timeout(client.wait_for_commands(1)).await;

    instance.suspend();
    assert_eq!(instance.status(), ScriptStatus::Suspended);

    // Let any in-flight statement finish, then confirm nothing else runs.
    tokio::time::sleep(Duration::from_millis(150)).await;
    let frozen = client.commands().len();
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(client.commands().len(), frozen);

    instance.resume();
    assert_eq!(instance.status(), ScriptStatus::Running);
    with_timeout(client.wait_for_commands(frozen + 2)).await;

    instance.stop();
    with_timeout(instance.join()).await;
}

#[tokio::test]
async fn test_resume_when_not_suspended_is_not_remembered() {
    init_tracing();

    let client = RecordingClient::new();
    let instance = wsl_instance("loop", LOOP);
    instance.start(client.as_client(), "", StopCounter::new().on_stop());
    with_timeout(client.wait_for_commands(1)).await;

    // No-op: nothing is suspended yet.
    instance.resume();
    assert_eq!(instance.status(), ScriptStatus::Running);

    instance.suspend();
    tokio::time::sleep(Duration::from_millis(150)).await;
    let frozen = client.commands().len();
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(
        client.commands().len(),
        frozen,
        "an earlier resume must not release a later suspend"
    );

    instance.stop();
    with_timeout(instance.join()).await;
}

#[tokio::test]
async fn test_stop_while_suspended() {
    init_tracing();

    let client = RecordingClient::new();
    let stops = StopCounter::new();
    let instance = wsl_instance("loop", LOOP);
    instance.start(client.as_client(), "", stops.on_stop());
    with_timeout(client.wait_for_commands(1)).await;

    instance.suspend();
    tokio::time::sleep(Duration::from_millis(100)).await;
    instance.stop();
    with_timeout(instance.join()).await;

    assert_eq!(instance.status(), ScriptStatus::Stopped);
    assert_eq!(stops.count(), 1);

    // Resume after stop changes nothing.
    instance.resume();
    instance.suspend();
    assert_eq!(instance.status(), ScriptStatus::Stopped);
}

#[tokio::test]
async fn test_suspend_outside_running_is_noop() {
    init_tracing();

    let instance = wsl_instance("idle", "put look\n");
    instance.suspend();
    assert_eq!(instance.status(), ScriptStatus::NotStarted);
    instance.resume();
    assert_eq!(instance.status(), ScriptStatus::NotStarted);
}

#[tokio::test]
async fn test_tight_local_loop_is_stoppable() {
    init_tracing();

    let client = RecordingClient::new();
    let stops = StopCounter::new();
    let instance = wsl_instance("spin", "top:\ncounter add 1\ngoto top\n");
    instance.start(client.as_client(), "", stops.on_stop());

    tokio::time::sleep(Duration::from_millis(50)).await;
    instance.stop();
    with_timeout(instance.join()).await;

    assert_eq!(stops.count(), 1);
}

#[tokio::test]
async fn test_concurrent_instances_are_independent() {
    init_tracing();

    let client = RecordingClient::new();
    let a_stops = StopCounter::new();
    let b_stops = StopCounter::new();
    let a = wsl_instance("a", LOOP);
    let b = wsl_instance("b", "setlocalvariable x mine\npause 0.3\necho %x\n");

    a.start(client.as_client(), "", a_stops.on_stop());
    b.start(client.as_client(), "", b_stops.on_stop());
    with_timeout(client.wait_for_commands(1)).await;

    a.suspend();
    assert_eq!(b.status(), ScriptStatus::Running);

    with_timeout(b.join()).await;
    assert_eq!(b_stops.count(), 1);
    assert!(client.message_texts().contains(&"mine".to_string()));
    assert_eq!(a.status(), ScriptStatus::Suspended);

    a.stop();
    with_timeout(a.join()).await;
    assert_eq!(a_stops.count(), 1);
}

#[tokio::test]
async fn test_status_is_observable() {
    init_tracing();

    let client = RecordingClient::new();
    let instance = wsl_instance("watch", "pause 0.1\n");
    let mut rx = instance.subscribe_status();

    instance.start(client.as_client(), "", StopCounter::new().on_stop());
    with_timeout(rx.wait_for(|s| *s == ScriptStatus::Stopped))
        .await
        .unwrap();

    assert_ne!(instance.id(), wsl_instance("watch", "").id());
    assert_eq!(instance.name(), "watch");
}
