//! One-shot script: authorize, create a test event, print the link.

use anyhow::Result;

use daybook_auth::{
    obtain_credential, ClientSecret, CredentialStore, GoogleAuthenticator, InteractiveFlow,
    CALENDAR_SCOPE,
};
use daybook_calendar::ops::{self, CreateEventArgs};
use daybook_calendar::{CalendarClient, CalendarContext};
use daybook_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    daybook_core::init()?;

    let config = Config::load()?;

    let secret = ClientSecret::load(&config.credentials_path)?;
    let authenticator = GoogleAuthenticator::from_secret(&secret);
    let store = CredentialStore::new(&config.token_path);
    let flow = InteractiveFlow::new(
        GoogleAuthenticator::from_secret(&secret),
        vec![CALENDAR_SCOPE.to_string()],
    );

    let credential = obtain_credential(&store, &authenticator, &flow).await?;

    let ctx = CalendarContext::new(
        CalendarClient::new(&credential.access_token),
        config.calendar_id.clone(),
    );

    let result = ops::create_event(
        &ctx,
        CreateEventArgs {
            summary: "Test Event".to_string(),
            description: Some(
                "This is a test event created by the Google Calendar API.".to_string(),
            ),
            location: Some("123 Test St, Test City, TC 12345".to_string()),
            ..Default::default()
        },
    )
    .await?;

    println!("{}", result);
    Ok(())
}
