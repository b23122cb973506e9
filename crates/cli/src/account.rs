//! `lenslink login` / `lenslink logout` — API token storage.

use std::io::{self, Write};

use lenslink_remote::auth::{delete_auth, save_auth, AuthCredentials};
use lenslink_remote::{RemoteClient, RemoteError};

use crate::exit_codes::{
    remote_error, EXIT_ERROR, EXIT_REMOTE_NETWORK, EXIT_REMOTE_NOT_AUTH, EXIT_USAGE,
};
use crate::CliError;

pub fn cmd_login(token: Option<String>, api_base: String) -> Result<(), CliError> {
    // --token (or LENSLINK_API_TOKEN via clap) already resolved; last
    // resort is an interactive prompt.
    let token = if let Some(t) = token {
        t
    } else if atty::is(atty::Stream::Stdin) {
        eprint!("Photo host API token: ");
        io::stderr().flush().ok();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).map_err(|e| CliError {
            code: EXIT_ERROR,
            message: e.to_string(),
            hint: None,
        })?;
        let trimmed = buf.trim().to_string();
        if trimmed.is_empty() {
            return Err(CliError {
                code: EXIT_USAGE,
                message: "No token provided".into(),
                hint: Some("pass --token or set LENSLINK_API_TOKEN".into()),
            });
        }
        trimmed
    } else {
        return Err(CliError {
            code: EXIT_USAGE,
            message: "No token provided and stdin is not a TTY".into(),
            hint: Some("pass --token or set LENSLINK_API_TOKEN".into()),
        });
    };

    // Verify the token works
    let creds = AuthCredentials::new(token.clone(), api_base.clone());
    let client = RemoteClient::new(creds);

    let account = client.verify_token().map_err(|e| match e {
        RemoteError::Http(401, _) | RemoteError::Http(403, _) => CliError {
            code: EXIT_REMOTE_NOT_AUTH,
            message: "Invalid API token".into(),
            hint: Some("generate a new token in the host's account settings".into()),
        },
        RemoteError::Network(msg) => CliError {
            code: EXIT_REMOTE_NETWORK,
            message: format!("Cannot reach the photo host: {}", msg),
            hint: None,
        },
        other => remote_error(other),
    })?;

    // Save with account info
    let creds = AuthCredentials {
        token,
        api_base,
        account: Some(account.clone()),
    };

    save_auth(&creds).map_err(|e| CliError {
        code: EXIT_ERROR,
        message: e,
        hint: None,
    })?;

    eprintln!("Authenticated as {}", account);
    Ok(())
}

pub fn cmd_logout() -> Result<(), CliError> {
    delete_auth().map_err(|e| CliError {
        code: EXIT_ERROR,
        message: e,
        hint: None,
    })?;
    eprintln!("Logged out");
    Ok(())
}
