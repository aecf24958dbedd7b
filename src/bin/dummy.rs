use horario::client::RemoteStore;
use horario::week;
use horario::Controller;

#[tokio::main]
async fn main() {
    // This is just a function to silence "unused function" warning

    let store = RemoteStore::from_config().unwrap();
    let mut controller = Controller::new(store);
    controller.refresh().await.unwrap();

    let week_start = week::current_week_start();
    let _ = horario::expand::week_occurrences(controller.tasks(), week_start)
        .iter()
        .map(|occurrence| println!("  {}\t{}", occurrence.date(), occurrence.task().title()))
        .collect::<()>();
}
