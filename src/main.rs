use anyhow::Result;

use solpay_lib::start_app;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    start_app().await
}
