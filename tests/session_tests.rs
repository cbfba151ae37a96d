
use gpgedit::crypto::WorkspaceConfig;
use gpgedit::errors::{AccessError, AppError, CryptoError, EditorError};
use gpgedit::process::CommandStatus;
use gpgedit::session::{EditRequest, EditSession, SessionState};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use test_helpers::{
    read_fake_ciphertext, write_fake_ciphertext, FakeToolchain, ScriptedPrompter, FAKE_EDITOR,
    FAKE_GPG, TEST_PASSPHRASE,
};

struct Fixture {
    files: TempDir,
    shm: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            files: tempfile::tempdir().unwrap(),
            shm: tempfile::tempdir().unwrap(),
        }
    }

    fn target(&self) -> PathBuf {
        self.files.path().join("notes.txt.gpg")
    }

    fn workspace(&self) -> WorkspaceConfig {
        WorkspaceConfig::new(self.shm.path(), "tester")
    }

    fn workspace_dir(&self) -> PathBuf {
        self.workspace().directory()
    }

    fn request(&self) -> EditRequest {
        EditRequest {
            target: self.target(),
            read_only: false,
            change_passphrase: false,
            editor: FAKE_EDITOR.to_string(),
            min_duration: Duration::ZERO,
        }
    }
}

fn run_session(
    fixture: &Fixture,
    request: EditRequest,
    tools: &FakeToolchain,
    prompter: &ScriptedPrompter,
) -> (Result<(), AppError>, SessionState, Option<PathBuf>) {
    let mut session = EditSession::new(request, fixture.workspace(), FAKE_GPG, tools, prompter);
    let result = session.run();
    let state = session.state();
    let scratch = session.scratch().map(Path::to_path_buf);
    session.conclude(&result).unwrap();
    (result, state, scratch)
}

#[test]
fn test_edit_existing_file() {
    let fixture = Fixture::new();
    write_fake_ciphertext(&fixture.target(), TEST_PASSPHRASE, "line one\n");
    let tools = FakeToolchain::appending("line two\n");
    let prompter = ScriptedPrompter::new(&[TEST_PASSPHRASE]);

    let (result, state, _) = run_session(&fixture, fixture.request(), &tools, &prompter);

    assert!(result.is_ok(), "session failed: {:?}", result);
    assert_eq!(state, SessionState::Done);
    assert_eq!(tools.calls(), ["gpg --decrypt", "editor", "gpg --symmetric"]);
    assert_eq!(prompter.prompts(), ["Passphrase: "]);
    assert_eq!(
        read_fake_ciphertext(&fixture.target(), TEST_PASSPHRASE).as_deref(),
        Some("line one\nline two\n")
    );
    assert!(!fixture.workspace_dir().exists(), "workspace should be removed");
}

#[test]
fn test_editor_sees_private_scratch_file() {
    let fixture = Fixture::new();
    write_fake_ciphertext(&fixture.target(), TEST_PASSPHRASE, "secret\n");
    let tools = FakeToolchain::new();
    let prompter = ScriptedPrompter::new(&[TEST_PASSPHRASE]);

    let (result, _, _) = run_session(&fixture, fixture.request(), &tools, &prompter);
    assert!(result.is_ok());

    let visits = tools.visits();
    assert_eq!(visits.len(), 1);
    let visit = &visits[0];
    assert_eq!(visit.content, "secret\n");
    assert_eq!(visit.mode, 0o600);
    assert_eq!(visit.path.parent(), Some(fixture.workspace_dir().as_path()));

    let name = visit.path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.ends_with("-notes.txt"), "unexpected scratch name {}", name);
    assert!(!visit.path.exists(), "scratch file should be deleted");
}

#[test]
fn test_new_file_is_created() {
    let fixture = Fixture::new();
    let tools = FakeToolchain::appending("fresh\n");
    let prompter = ScriptedPrompter::new(&[TEST_PASSPHRASE, TEST_PASSPHRASE]);

    let (result, state, _) = run_session(&fixture, fixture.request(), &tools, &prompter);

    assert!(result.is_ok(), "session failed: {:?}", result);
    assert_eq!(state, SessionState::Done);
    assert_eq!(tools.calls(), ["editor", "gpg --symmetric"]);
    assert_eq!(prompter.prompts(), ["Passphrase: ", "Confirm passphrase: "]);
    assert_eq!(tools.visits()[0].content, "");
    assert_eq!(
        read_fake_ciphertext(&fixture.target(), TEST_PASSPHRASE).as_deref(),
        Some("fresh\n")
    );
    assert!(!fixture.workspace_dir().exists());
}

#[test]
fn test_new_file_passphrase_mismatch_aborts_early() {
    let fixture = Fixture::new();
    let tools = FakeToolchain::new();
    let prompter = ScriptedPrompter::new(&["one", "two"]);

    let (result, state, _) = run_session(&fixture, fixture.request(), &tools, &prompter);

    match result {
        Err(AppError::Crypto(CryptoError::PassphraseMismatch)) => {}
        other => panic!("Expected PassphraseMismatch, got {:?}", other),
    }
    assert_eq!(state, SessionState::Failed { preserve_scratch: false });
    assert!(tools.calls().is_empty());
    assert!(!fixture.target().exists());
    assert!(!fixture.workspace_dir().exists(), "no workspace before passphrases");
}

#[test]
fn test_new_file_rejects_empty_passphrase() {
    let fixture = Fixture::new();
    let tools = FakeToolchain::new();
    let prompter = ScriptedPrompter::new(&["", ""]);

    let (result, _, _) = run_session(&fixture, fixture.request(), &tools, &prompter);

    match result {
        Err(AppError::Crypto(CryptoError::EmptyPassphrase)) => {}
        other => panic!("Expected EmptyPassphrase, got {:?}", other),
    }
    assert_eq!(prompter.prompts(), ["Passphrase: "]);
    assert!(tools.calls().is_empty());
}

#[test]
fn test_wrong_passphrase_fails_before_editing() {
    let fixture = Fixture::new();
    write_fake_ciphertext(&fixture.target(), TEST_PASSPHRASE, "content\n");
    let original = fs::read(fixture.target()).unwrap();
    let tools = FakeToolchain::new();
    let prompter = ScriptedPrompter::new(&["wrong"]);

    let (result, state, _) = run_session(&fixture, fixture.request(), &tools, &prompter);

    let err = result.unwrap_err();
    assert!(matches!(err, AppError::Crypto(CryptoError::DecryptFailed { .. })));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(state, SessionState::Failed { preserve_scratch: false });
    assert_eq!(tools.calls(), ["gpg --decrypt"]);
    assert_eq!(fs::read(fixture.target()).unwrap(), original);
    assert!(!fixture.workspace_dir().exists());
}

#[test]
fn test_change_passphrase() {
    let fixture = Fixture::new();
    write_fake_ciphertext(&fixture.target(), "old", "content\n");
    let tools = FakeToolchain::new();
    let prompter = ScriptedPrompter::new(&["old", "new", "new"]);
    let request = EditRequest {
        change_passphrase: true,
        ..fixture.request()
    };

    let (result, _, _) = run_session(&fixture, request, &tools, &prompter);

    assert!(result.is_ok(), "session failed: {:?}", result);
    assert_eq!(
        prompter.prompts(),
        ["Passphrase: ", "New passphrase: ", "Confirm new passphrase: "]
    );
    assert!(read_fake_ciphertext(&fixture.target(), "old").is_none());
    assert_eq!(
        read_fake_ciphertext(&fixture.target(), "new").as_deref(),
        Some("content\n")
    );
}

#[test]
fn test_change_passphrase_mismatch_leaves_file_alone() {
    let fixture = Fixture::new();
    write_fake_ciphertext(&fixture.target(), "old", "content\n");
    let original = fs::read(fixture.target()).unwrap();
    let tools = FakeToolchain::new();
    let prompter = ScriptedPrompter::new(&["old", "new", "typo"]);
    let request = EditRequest {
        change_passphrase: true,
        ..fixture.request()
    };

    let (result, _, _) = run_session(&fixture, request, &tools, &prompter);

    let err = result.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cryptographic error: Passphrases do not match; nothing was changed"
    );
    assert!(tools.calls().is_empty());
    assert_eq!(fs::read(fixture.target()).unwrap(), original);
    assert!(!fixture.workspace_dir().exists());
}

#[test]
fn test_read_only_discards_edits() {
    let fixture = Fixture::new();
    write_fake_ciphertext(&fixture.target(), TEST_PASSPHRASE, "keep me\n");
    let original = fs::read(fixture.target()).unwrap();
    let tools = FakeToolchain::appending("discarded\n");
    let prompter = ScriptedPrompter::new(&[TEST_PASSPHRASE]);
    let request = EditRequest {
        read_only: true,
        ..fixture.request()
    };

    let (result, state, _) = run_session(&fixture, request, &tools, &prompter);

    assert!(result.is_ok());
    assert_eq!(state, SessionState::Done);
    assert_eq!(tools.calls(), ["gpg --decrypt", "editor"]);
    assert_eq!(fs::read(fixture.target()).unwrap(), original);
    assert!(!fixture.workspace_dir().exists());
}

#[test]
fn test_read_only_missing_file_fails_without_prompting() {
    let fixture = Fixture::new();
    let tools = FakeToolchain::new();
    let prompter = ScriptedPrompter::new(&[]);
    let request = EditRequest {
        read_only: true,
        ..fixture.request()
    };

    let (result, state, scratch) = run_session(&fixture, request, &tools, &prompter);

    match result {
        Err(AppError::Access(AccessError::NotFound { path })) => assert_eq!(path, fixture.target()),
        other => panic!("Expected NotFound, got {:?}", other),
    }
    assert_eq!(state, SessionState::Failed { preserve_scratch: false });
    assert!(scratch.is_none());
    assert!(prompter.prompts().is_empty());
    assert!(!fixture.workspace_dir().exists());
}

#[test]
fn test_directory_target_is_rejected() {
    let fixture = Fixture::new();
    let tools = FakeToolchain::new();
    let prompter = ScriptedPrompter::new(&[]);
    let request = EditRequest {
        target: fixture.files.path().to_path_buf(),
        ..fixture.request()
    };

    let (result, _, _) = run_session(&fixture, request, &tools, &prompter);

    assert!(matches!(
        result,
        Err(AppError::Access(AccessError::NotAFile { .. }))
    ));
    assert!(prompter.prompts().is_empty());
}

#[test]
fn test_unwritable_target_fails_without_prompting() {
    use std::os::unix::fs::PermissionsExt;

    // SAFETY: getuid(2) cannot fail.
    if unsafe { libc::getuid() } == 0 {
        eprintln!("skipping: root ignores permission bits");
        return;
    }
    let fixture = Fixture::new();
    write_fake_ciphertext(&fixture.target(), TEST_PASSPHRASE, "content\n");
    fs::set_permissions(fixture.target(), fs::Permissions::from_mode(0o400)).unwrap();
    let tools = FakeToolchain::new();
    let prompter = ScriptedPrompter::new(&[TEST_PASSPHRASE]);

    let (result, state, scratch) = run_session(&fixture, fixture.request(), &tools, &prompter);

    match result {
        Err(AppError::Access(AccessError::Unwritable { path, .. })) => {
            assert_eq!(path, fixture.target())
        }
        other => panic!("Expected Unwritable, got {:?}", other),
    }
    assert_eq!(state, SessionState::Failed { preserve_scratch: false });
    assert!(scratch.is_none());
    assert!(prompter.prompts().is_empty());
    assert!(tools.calls().is_empty());
    assert!(!fixture.workspace_dir().exists());
}

#[test]
fn test_editor_failure_discards_edits() {
    let fixture = Fixture::new();
    write_fake_ciphertext(&fixture.target(), TEST_PASSPHRASE, "content\n");
    let original = fs::read(fixture.target()).unwrap();
    let tools = FakeToolchain::with_editor(|path| {
        fs::write(path, "half-finished")?;
        Ok(CommandStatus::exited(1))
    });
    let prompter = ScriptedPrompter::new(&[TEST_PASSPHRASE]);

    let (result, state, scratch) = run_session(&fixture, fixture.request(), &tools, &prompter);

    match result {
        Err(AppError::Editor(EditorError::NonZeroExit { status_code, .. })) => {
            assert_eq!(status_code, 1)
        }
        other => panic!("Expected NonZeroExit, got {:?}", other),
    }
    assert_eq!(state, SessionState::Failed { preserve_scratch: false });
    assert_eq!(tools.calls(), ["gpg --decrypt", "editor"]);
    assert_eq!(fs::read(fixture.target()).unwrap(), original);
    assert!(prompter.acknowledgments().is_empty());
    assert!(!scratch.unwrap().exists());
    assert!(!fixture.workspace_dir().exists());
}

#[test]
fn test_editor_killed_by_signal() {
    let fixture = Fixture::new();
    let tools = FakeToolchain::with_editor(|_| Ok(CommandStatus::signaled()));
    let prompter = ScriptedPrompter::new(&[TEST_PASSPHRASE, TEST_PASSPHRASE]);

    let (result, _, _) = run_session(&fixture, fixture.request(), &tools, &prompter);

    assert!(matches!(
        result,
        Err(AppError::Editor(EditorError::Terminated { .. }))
    ));
    assert!(!fixture.target().exists());
    assert!(!fixture.workspace_dir().exists());
}

#[test]
fn test_encrypt_failure_keeps_scratch_until_acknowledged() {
    let fixture = Fixture::new();
    write_fake_ciphertext(&fixture.target(), TEST_PASSPHRASE, "draft\n");
    let tools = FakeToolchain::appending("precious\n").failing_encrypt();
    let prompter = ScriptedPrompter::new(&[TEST_PASSPHRASE]);

    let mut session = EditSession::new(
        fixture.request(),
        fixture.workspace(),
        FAKE_GPG,
        &tools,
        &prompter,
    );
    let result = session.run();

    assert_eq!(session.state(), SessionState::Failed { preserve_scratch: true });
    let scratch = session.scratch().unwrap().to_path_buf();
    let err = result.as_ref().unwrap_err();
    assert_eq!(err.preserved_scratch(), Some(scratch.as_path()));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(fs::read_to_string(&scratch).unwrap(), "draft\nprecious\n");

    session.conclude(&result).unwrap();

    let acknowledgments = prompter.acknowledgments();
    assert_eq!(acknowledgments.len(), 1);
    assert!(acknowledgments[0].contains(&format!("{:?}", scratch)));
    assert!(!scratch.exists());
    assert!(!fixture.workspace_dir().exists());
}

#[test]
fn test_encrypt_failure_without_acknowledgment_keeps_scratch() {
    let fixture = Fixture::new();
    let tools = FakeToolchain::appending("precious\n").failing_encrypt();
    let prompter =
        ScriptedPrompter::new(&[TEST_PASSPHRASE, TEST_PASSPHRASE]).refusing_acknowledgment();

    let (result, _, scratch) = run_session(&fixture, fixture.request(), &tools, &prompter);

    assert!(matches!(
        result,
        Err(AppError::Crypto(CryptoError::EncryptFailed { .. }))
    ));
    let scratch = scratch.unwrap();
    assert_eq!(prompter.acknowledgments().len(), 1);
    assert_eq!(fs::read_to_string(&scratch).unwrap(), "precious\n");
    assert!(fixture.workspace_dir().exists());
    assert!(!fixture.target().exists());
}

#[test]
fn test_workspace_with_wrong_permissions_is_refused() {
    use std::os::unix::fs::PermissionsExt;

    let fixture = Fixture::new();
    fs::create_dir(fixture.workspace_dir()).unwrap();
    fs::set_permissions(fixture.workspace_dir(), fs::Permissions::from_mode(0o755)).unwrap();
    let tools = FakeToolchain::new();
    let prompter = ScriptedPrompter::new(&[TEST_PASSPHRASE, TEST_PASSPHRASE]);

    let mut session = EditSession::new(
        fixture.request(),
        fixture.workspace(),
        FAKE_GPG,
        &tools,
        &prompter,
    );
    let result = session.run();

    let message = result.as_ref().unwrap_err().to_string();
    assert!(message.contains("wrong permissions"), "got {}", message);
    assert!(message.contains("755 instead of 700"), "got {}", message);
    assert!(session.scratch().is_none());
    assert!(tools.calls().is_empty());
    session.conclude(&result).unwrap();
}

#[test]
fn test_session_records_elapsed_time() {
    let fixture = Fixture::new();
    let tools = FakeToolchain::new();
    let prompter = ScriptedPrompter::new(&[TEST_PASSPHRASE, TEST_PASSPHRASE]);
    let request = EditRequest {
        min_duration: Duration::from_secs(3600),
        ..fixture.request()
    };

    let mut session = EditSession::new(request, fixture.workspace(), FAKE_GPG, &tools, &prompter);
    assert_eq!(session.state(), SessionState::Init);
    assert!(session.elapsed().is_none());

    let result = session.run();
    assert!(result.is_ok());
    assert!(session.elapsed().unwrap() < Duration::from_secs(3600));
    session.conclude(&result).unwrap();
}
