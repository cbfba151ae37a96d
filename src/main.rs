/*!
# gpgedit - Edit Encrypted Files in Place

gpgedit decrypts a GnuPG symmetrically encrypted file into a private scratch
file, opens it in your editor, and re-encrypts it when the editor exits.

## Usage

```text
gpgedit [OPTIONS] <FILE>

Options:
  -e, --editor <PROGRAM>     Editor to use (defaults to $VISUAL, then $EDITOR, then vi)
  -r, --read-only            Read-only mode: all changes will be discarded [aliases: ro]
  -u, --change-passphrase    Re-encrypt the file with a new passphrase
  -w, --warn <SECONDS>       Warn if the session ends after less than SECONDS seconds
      --gpg <PROGRAM>        GnuPG program to invoke (defaults to $GPGEDIT_GPG, then gpg)
  -v, --verbose              Print verbose output
  -h, --help                 Print help
  -V, --version              Print version
```

## Exit Codes

- `0`: the session completed
- `1`: the session failed (access, workspace, crypto or editor error)
- `2`: the command line was invalid
*/

use clap::{CommandFactory, Parser};
use gpgedit::cli::CliArgs;
use gpgedit::config::Config;
use gpgedit::constants::{
    EXIT_RUNTIME_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR, TRACING_ROOT_SPAN_NAME,
    TRACING_SERVICE_NAME,
};
use gpgedit::logging::{init_tracing, LogFormat};
use gpgedit::process::SystemRunner;
use gpgedit::prompt::TerminalPrompter;
use gpgedit::session::{EditRequest, EditSession};
use tracing::{debug, info, info_span};

fn main() {
    std::process::exit(run());
}

/// Runs the application and returns the process exit code.
///
/// 1. Parses and validates command-line arguments
/// 2. Initializes logging
/// 3. Resolves configuration
/// 4. Runs the edit session
/// 5. Concludes the session, asking before deleting unsaved plaintext
fn run() -> i32 {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                EXIT_USAGE_ERROR
            } else {
                EXIT_SUCCESS
            };
        }
    };

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        eprintln!("{}", CliArgs::command().render_usage());
        return e.exit_code();
    }

    let initialized = LogFormat::from_env().and_then(|format| init_tracing(args.verbose, format));
    if let Err(e) = initialized {
        eprintln!("Error: {}", e);
        return e.exit_code();
    }

    let correlation_id = uuid::Uuid::new_v4();
    let root_span = info_span!(
        TRACING_ROOT_SPAN_NAME,
        service_name = TRACING_SERVICE_NAME,
        correlation_id = %correlation_id
    );
    let _enter = root_span.enter();

    info!("Starting gpgedit");
    debug!("CLI arguments: {:?}", args);

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return e.exit_code();
        }
    };
    debug!("Configuration: {:?}", config);

    let request = EditRequest {
        target: args.file.clone(),
        read_only: args.read_only,
        change_passphrase: args.change_passphrase,
        editor: config.editor.clone(),
        min_duration: config.min_duration,
    };

    let mut session = EditSession::new(
        request,
        config.workspace.clone(),
        config.gpg_program.clone(),
        &SystemRunner,
        &TerminalPrompter,
    );

    let result = session.run();
    if let Err(e) = &result {
        eprintln!("Error: {}", e);
    }

    if let Err(e) = session.conclude(&result) {
        eprintln!("Error: failed to clean up the temporary workspace: {}", e);
        if result.is_ok() {
            return EXIT_RUNTIME_ERROR;
        }
    }

    match result {
        Ok(()) => {
            info!("Session completed");
            EXIT_SUCCESS
        }
        Err(e) => e.exit_code(),
    }
}
