use std::process::Command;

fn run(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_ecosystem"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to launch ecosystem binary")
}

#[test]
fn bounded_run_prints_each_iteration() {
    let output = run(&["--max-ticks", "3", "--interval-ms", "0", "--no-clear"]);
    assert!(output.status.success(), "ecosystem should exit cleanly");

    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    for iteration in 0..=3 {
        assert!(
            stdout.contains(&format!("Iteration: {iteration} - Occupied Cells: ")),
            "missing status line for iteration {iteration}"
        );
    }
    assert!(stdout.contains("Plants: "));
    assert!(!stdout.contains("\x1b[2J"));
}

#[test]
fn empty_world_stops_after_first_frame() {
    let output = run(&[
        "--plants",
        "0",
        "--herbivores",
        "0",
        "--carnivores",
        "0",
        "--interval-ms",
        "0",
        "--no-clear",
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(stdout.contains("Iteration: 0 - Occupied Cells: 0"));
    assert!(!stdout.contains("Iteration: 1"));
}

#[test]
fn zero_sized_world_is_rejected() {
    let output = run(&["--width", "0", "--max-ticks", "1", "--interval-ms", "0"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).expect("utf-8 output");
    assert!(stderr.contains("failed to create world"));
}
