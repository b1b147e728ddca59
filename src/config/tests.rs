// Author: Dustin Pilgrim
// License: MIT

#[cfg(test)]
use super::*;
use std::collections::HashMap;
use std::fs;

use serde::Deserialize;
use tempfile::TempDir;

fn write_tree(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create dirs");
        }
        fs::write(path, content).expect("write file");
    }
    dir
}

#[test]
fn test_config_from_string() {
    let yaml = r#"
app_name: TestApp
app:
  name: "{{ app_name }}"
  version: "1.0.0"
  debug: true
  server:
    host: localhost
    port: 8080
  features:
    - auth
    - logging
"#;
    let config = XymlFile::from_str(yaml, &Options::default()).expect("Failed to parse config");

    let app_name: String = config.get("app.name").expect("Failed to get app.name");
    assert_eq!(app_name, "TestApp");

    let port: u16 = config.get("app.server.port").expect("Failed to get port");
    assert_eq!(port, 8080);

    let debug: bool = config.get("app.debug").expect("Failed to get debug");
    assert!(debug);

    let features: Vec<String> = config.get("app.features").expect("Failed to get features");
    assert_eq!(features, vec!["auth", "logging"]);

    let first: String = config.get("app.features[0]").unwrap();
    assert_eq!(first, "auth");

    assert!(config.has("app.name"));
    assert!(!config.has("app.nonexistent"));

    let server_keys = config.get_keys("app.server").expect("Failed to get server keys");
    assert_eq!(server_keys, vec!["host", "port"]);
}

#[test]
fn test_snake_and_kebab_fallback() {
    let config = XymlFile::from_str("monitor-media: true\nidle_time: 30\n", &Options::default()).unwrap();

    assert!(config.get::<bool>("monitor_media").unwrap());
    assert_eq!(config.get::<u32>("idle-time").unwrap(), 30);
}

#[test]
fn test_optional_and_default_access() {
    let config = XymlFile::from_str("timeout: 5\nnothing: ~\n", &Options::default()).unwrap();

    assert_eq!(config.get_optional::<u64>("timeout").unwrap(), Some(5));
    assert_eq!(config.get_optional::<u64>("missing").unwrap(), None);
    assert_eq!(config.get::<Option<String>>("nothing").unwrap(), None);
    assert_eq!(config.get_or("missing", 30u64), 30);

    // Present but of the wrong type is still an error.
    assert!(config.get_optional::<bool>("timeout").is_err());
}

#[test]
fn test_root_value() {
    let config = XymlFile::from_str("a: 1\n", &Options::default()).unwrap();
    assert_eq!(config.get_value("").unwrap(), *config.content());
}

#[test]
fn test_numeric_conversions() {
    let config = XymlFile::from_str("small: 10\nbig: 1000000\nneg: -1\nratio: 0.5\nwhole: 3.0\n", &Options::default())
        .unwrap();

    assert_eq!(config.get::<u8>("small").unwrap(), 10);
    assert_eq!(config.get::<u32>("big").unwrap(), 1_000_000);
    assert_eq!(config.get::<i32>("neg").unwrap(), -1);
    assert_eq!(config.get::<i64>("whole").unwrap(), 3);
    assert!((config.get::<f32>("ratio").unwrap() - 0.5).abs() < f32::EPSILON);
    assert_eq!(config.get::<f64>("small").unwrap(), 10.0);

    let err = config.get::<u8>("big").unwrap_err();
    assert_eq!(err.code(), Some(407));
    let err = config.get::<u64>("neg").unwrap_err();
    assert_eq!(err.code(), Some(407));
    let err = config.get::<i64>("ratio").unwrap_err();
    assert_eq!(err.code(), Some(406));
}

#[test]
fn test_type_mismatch_errors() {
    let config = XymlFile::from_str("value: not a number\nflag: truee\nlist: [1, x]\n", &Options::default()).unwrap();

    let err = config.get::<i32>("value").unwrap_err();
    match err {
        XymlError::TypeError { message, code, .. } => {
            assert_eq!(code, Some(402));
            assert!(message.contains("at 'value'"));
        }
        other => panic!("Expected TypeError, got {:?}", other),
    }

    assert_eq!(config.get::<bool>("flag").unwrap_err().code(), Some(404));
    assert_eq!(config.get::<Vec<i64>>("list").unwrap_err().code(), Some(402));
    assert_eq!(config.get::<String>("list").unwrap_err().code(), Some(401));
}

#[test]
fn test_hashmap_conversion() {
    let config = XymlFile::from_str("ports:\n  http: 80\n  https: 443\nnames:\n  a: x\n", &Options::default()).unwrap();

    let ports: HashMap<String, u16> = config.get("ports").unwrap();
    assert_eq!(ports.get("https"), Some(&443));

    let names: HashMap<String, String> = config.get("names").unwrap();
    assert_eq!(names.get("a").map(String::as_str), Some("x"));

    assert_eq!(config.get::<HashMap<String, String>>("ports.http").unwrap_err().code(), Some(410));
}

#[test]
fn test_includes_resolved_from_file_directory() {
    let dir = write_tree(&[
        (
            "main.yaml",
            "name: svc\nserver:\n  host: \"{{ defaults.host }}\"\nxyml.include: parts/defaults.yaml\n",
        ),
        ("parts/defaults.yaml", "defaults:\n  host: example.org\n  port: 8080\nxyml.include: extra.yaml\n"),
        ("parts/extra.yaml", "label: \"{{ name }}-{{ defaults.port }}\"\n"),
    ]);

    let config = XymlFile::from_file(dir.path().join("main.yaml")).expect("load");

    assert_eq!(config.get::<String>("server.host").unwrap(), "example.org");
    assert_eq!(config.get::<String>("label").unwrap(), "svc-8080");
    assert_eq!(config.path(), Some(dir.path().join("main.yaml").as_path()));
}

#[test]
fn test_parameterized_include_on_disk() {
    let dir = write_tree(&[
        (
            "main.yaml",
            "services:\n- xyml.include: \"svc.yaml << name=api, port=8080 >>\"\n- xyml.include: \"svc.yaml << name=web, port=80 >>\"\n",
        ),
        ("svc.yaml", "name: \"{{ name }}\"\nport: \"{{ xyml.param.port }}\"\nurl: \"http://{{ name }}:{{ port }}\"\n"),
    ]);

    let config = XymlFile::from_file(dir.path().join("main.yaml")).unwrap();

    let ports: Vec<u16> = config.get("services.port").unwrap();
    assert_eq!(ports, vec![8080, 80]);
    assert_eq!(config.get::<String>("services[1].url").unwrap(), "http://web:80");
}

#[test]
fn test_include_dirs_option() {
    let shared = write_tree(&[("common.yaml", "region: eu\n")]);
    let app = write_tree(&[("app.yaml", "xyml.include: common.yaml\nzone: \"{{ region }}-1\"\n")]);

    let err = XymlFile::from_file(app.path().join("app.yaml")).unwrap_err();
    assert!(matches!(err, XymlError::IncludeNotFound { .. }));

    let options = Options::new().include_dir(shared.path());
    let config = XymlFile::from_file_with_options(app.path().join("app.yaml"), &options).unwrap();
    assert_eq!(config.get::<String>("zone").unwrap(), "eu-1");
}

#[test]
fn test_root_file_including_itself_is_a_cycle() {
    let dir = write_tree(&[("loop.yaml", "a: 1\nxyml.include: loop.yaml\n")]);
    let err = XymlFile::from_file(dir.path().join("loop.yaml")).unwrap_err();
    assert_eq!(err.code(), Some(311));
}

#[test]
fn test_params_option() {
    let options = Options::new().param("env", "prod").param("replicas", 3i64);
    let config = XymlFile::from_str(
        "name: \"app-{{ xyml.param.env }}\"\nreplicas: \"{{ xyml.param.replicas }}\"\n",
        &options,
    )
    .unwrap();

    assert_eq!(config.get::<String>("name").unwrap(), "app-prod");
    assert_eq!(config.get_value("replicas").unwrap(), Value::Integer(3));
}

#[test]
fn test_fail_on_resolve_option() {
    let yaml = "a: \"{{ missing }}\"\n";

    let err = XymlFile::from_str(yaml, &Options::default()).unwrap_err();
    assert!(matches!(err, XymlError::ReferenceNotFound { .. }));

    let config = XymlFile::from_str(yaml, &Options::new().fail_on_resolve(false)).unwrap();
    assert_eq!(config.get::<String>("a").unwrap(), "{{ missing }}");
}

#[test]
fn test_fallback_loading() {
    let dir = write_tree(&[("fallback.yaml", "source: fallback\n")]);
    let options = Options::default();

    let config =
        XymlFile::from_file_with_fallback(dir.path().join("missing.yaml"), dir.path().join("fallback.yaml"), &options)
            .unwrap();
    assert_eq!(config.get::<String>("source").unwrap(), "fallback");

    let err = XymlFile::from_file_with_fallback(dir.path().join("a.yaml"), dir.path().join("b.yaml"), &options)
        .unwrap_err();
    match err {
        XymlError::FileError { message, code, .. } => {
            assert_eq!(code, Some(301));
            assert!(message.contains("fallback path"));
        }
        other => panic!("Expected FileError, got {:?}", other),
    }
}

#[test]
fn test_fallback_not_used_when_include_fails() {
    let dir = write_tree(&[
        ("primary.yaml", "xyml.include: broken.yaml\n"),
        ("broken.yaml", "a: [unclosed\n"),
        ("fallback.yaml", "source: fallback\n"),
    ]);

    let err = XymlFile::from_file_with_fallback(
        dir.path().join("primary.yaml"),
        dir.path().join("fallback.yaml"),
        &Options::default(),
    )
    .unwrap_err();
    match err {
        XymlError::FileError { path, code, .. } => {
            assert_eq!(code, Some(302));
            assert!(path.ends_with("broken.yaml"));
        }
        other => panic!("Expected FileError, got {:?}", other),
    }
}

#[test]
fn test_parameterized_include_stays_blind_when_lenient() {
    let dir = write_tree(&[
        ("main.yaml", "sibling: parent_secret\nconf:\n  xyml.include: \"file.yaml << p=1 >>\"\n"),
        ("file.yaml", "value: \"{{ sibling }}\"\n"),
    ]);

    let options = Options::new().fail_on_resolve(false);
    let err = XymlFile::from_file_with_options(dir.path().join("main.yaml"), &options).unwrap_err();
    match err {
        XymlError::ReferenceNotFound { segment, .. } => assert_eq!(segment, "sibling"),
        other => panic!("Expected ReferenceNotFound, got {:?}", other),
    }
}

#[test]
fn test_deserialize_into_struct() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Server {
        host: String,
        port: u16,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct App {
        name: String,
        server: Server,
        tags: Vec<String>,
    }

    let config = XymlFile::from_str(
        "base: 8000\nname: demo\nserver:\n  host: localhost\n  port: \"{{ base + 80 }}\"\ntags: [a, b]\n",
        &Options::default(),
    )
    .unwrap();

    let app: App = config.deserialize().expect("deserialize");
    assert_eq!(
        app,
        App {
            name: "demo".into(),
            server: Server { host: "localhost".into(), port: 8080 },
            tags: vec!["a".into(), "b".into()],
        }
    );
}

#[test]
fn test_from_value_with_memory_loader() {
    struct OneFile;

    impl Loader for OneFile {
        fn load(&self, _path: &Path) -> Result<Value, XymlError> {
            parse_document("from_loader: yes\n")
        }

        fn exists(&self, path: &Path) -> bool {
            path.ends_with("virtual.yaml")
        }
    }

    let tree = parse_document("xyml.include: virtual.yaml\n").unwrap();
    let config = XymlFile::from_value_with_loader(tree, &OneFile, &Options::default()).unwrap();
    assert_eq!(config.get::<String>("from_loader").unwrap(), "yes");
    assert!(config.path().is_none());
}
