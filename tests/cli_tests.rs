mod common;

use common::*;
use jmmc::ast::*;
use jmmc::{compile_file, Config, Error};
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn write_ast(dir: &TempDir, name: &str, spec: &NodeSpec) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, Ast::from_spec(spec).to_json().unwrap()).unwrap();
    path
}

#[test]
fn compile_file_reads_json_and_records_input() {
    init_logger();
    let dir = TempDir::new().unwrap();
    let path = write_ast(&dir, "sum.json", &summing_program());

    let output = compile_file(&path, &Config::default()).unwrap();
    assert!(output.is_success());
    let ir = output.ir.unwrap();
    assert_eq!(ir.config.input.as_deref(), Some(path.display().to_string().as_str()));
    assert!(ir.text.contains(".method public sum(n.i32).i32 {"));
}

#[test]
fn missing_input_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = compile_file(dir.path().join("absent.json"), &Config::default()).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn malformed_json_is_a_decode_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{\"kind\": ").unwrap();
    let err = compile_file(&path, &Config::default()).unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn binary_writes_every_artifact() {
    let dir = TempDir::new().unwrap();
    let input = write_ast(&dir, "sum.json", &summing_program());
    let out = dir.path().join("out");

    let status = Command::new(env!("CARGO_BIN_EXE_jmmc"))
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .status()
        .unwrap();
    assert!(status.success());

    let jasmin = fs::read_to_string(out.join("Sum.j")).unwrap();
    assert!(jasmin.starts_with(".class public Sum"));
    let ir = fs::read_to_string(out.join("Sum.ollir")).unwrap();
    assert!(ir.starts_with("import io;"));
    assert!(out.join("Sum.ast").is_file());
}

#[test]
fn binary_emit_filter_and_register_budget() {
    let dir = TempDir::new().unwrap();
    let input = write_ast(&dir, "sum.json", &summing_program());
    let out = dir.path().join("out");

    let status = Command::new(env!("CARGO_BIN_EXE_jmmc"))
        .args(["--emit", "jasmin", "-r", "2", "-o"])
        .arg(&out)
        .arg(&input)
        .status()
        .unwrap();
    assert!(status.success());

    assert!(!out.join("Sum.ollir").exists());
    assert!(!out.join("Sum.ast").exists());
    let jasmin = fs::read_to_string(out.join("Sum.j")).unwrap();
    assert!(jasmin.contains(".limit locals 6"));
    assert!(jasmin.contains(".limit locals 3"));
}

#[test]
fn binary_fails_on_semantic_errors() {
    let dir = TempDir::new().unwrap();
    let input = write_ast(&dir, "bad.json", &int_method_class(vec![ret(ident("missing"))]));
    let out = dir.path().join("out");

    let output = Command::new(env!("CARGO_BIN_EXE_jmmc")).arg(&input).arg("-o").arg(&out).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing"), "{}", stderr);
    assert!(!out.join("Test.j").exists());
}

#[test]
fn binary_rejects_missing_input() {
    let dir = TempDir::new().unwrap();
    let status = Command::new(env!("CARGO_BIN_EXE_jmmc"))
        .arg(dir.path().join("nothing.json"))
        .status()
        .unwrap();
    assert!(!status.success());
}
