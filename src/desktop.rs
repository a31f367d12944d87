// Start page selection for the desktop launcher

use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::constants::{CONTROL_PAGE, LOGIN_PAGE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartPage {
    Login,
    Controls,
}

impl StartPage {
    pub fn path(&self) -> &'static str {
        match self {
            StartPage::Login => LOGIN_PAGE,
            StartPage::Controls => CONTROL_PAGE,
        }
    }

    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckTokenResponse {
    has_token: bool,
}

/// Ask the running server whether it holds a usable token.
///
/// Anything other than a clear `{"hasToken": true}` leads to the login page.
pub async fn select_start_page(client: &Client, base_url: &str) -> StartPage {
    let url = format!("{}/check-token", base_url.trim_end_matches('/'));

    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!("Error checking token: {}", e);
            return StartPage::Login;
        }
    };

    match response.json::<CheckTokenResponse>().await {
        Ok(CheckTokenResponse { has_token: true }) => StartPage::Controls,
        Ok(_) => {
            debug!("No valid token, showing login page");
            StartPage::Login
        }
        Err(e) => {
            warn!("Unexpected /check-token response: {}", e);
            StartPage::Login
        }
    }
}
