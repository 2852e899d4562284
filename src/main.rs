mod api;
mod config;
mod console;
mod error;
mod list;
mod post;
mod review;
mod session;

use std::{error::Error, sync::Arc};

use log::info;
use rand::{rngs::StdRng, SeedableRng};

use api::AdminApi;
use config::Config;
use console::Console;
use list::ListController;
use session::{Authenticator, CREDENTIAL_POOL};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::parse();
    config.init_logger();
    info!("# Video Review Console #");
    info!("");

    let api = Arc::new(AdminApi::new(&config));
    let mut rng = StdRng::from_entropy();

    let authenticator = Authenticator::new();
    let session = authenticator
        .login_once(api.as_ref(), CREDENTIAL_POOL, &mut rng)
        .await?;
    api.authorize(&session.token);
    info!("Logged in as {}", session.username);

    let list = ListController::new(Arc::clone(&api), config.mode());
    let mut console = Console::new(api, list, session, rng);
    console.run(config.page()).await;

    info!("All done!");
    Ok(())
}
