use env_logger;
use log;

use table_sort::{
    Client, ClientField, ClientStatus, ClientType, Direction, FileStore, SortField, SortTable, SortTableBuilder,
    StoragePersistence,
};

fn client(
    id: u32,
    client_name: &str,
    client_type: ClientType,
    email: &str,
    status: ClientStatus,
    created_at: &str,
    updated_at: &str,
) -> Client {
    Client {
        id,
        client_name: client_name.into(),
        client_type,
        email: email.into(),
        status,
        created_at: created_at.into(),
        updated_at: updated_at.into(),
    }
}

fn render(title: &str, table: &SortTable<Client, StoragePersistence<FileStore>>) {
    let spec = table.spec();
    let criteria = Vec::from_iter(spec.iter().map(|c| {
        format!("{} ({})", c.field.label(), c.field.direction_label(c.direction))
    }));

    println!("== {}", title);
    println!("sort by: {}", if criteria.is_empty() { "-".to_owned() } else { criteria.join(", ") });
    println!(
        "{:<10} {:<12} {:<12} {:<18} {:<8} {}",
        "Client ID", "Client Name", "Client Type", "Email", "Status", "Created At"
    );
    for client in table.current_order() {
        println!(
            "{:<10} {:<12} {:<12} {:<18} {:<8} {}",
            client.id,
            client.client_name,
            client.client_type.label(),
            client.email,
            client.status.label(),
            client.created_at.get(..10).unwrap_or(&client.created_at),
        );
    }
    println!();
}

fn main() {
    env_logger::Builder::new().filter_level(log::LevelFilter::Debug).init();

    let clients = vec![
        client(20, "Hema", ClientType::Individual, "hema@email.com", ClientStatus::Active, "2023-01-15T10:00:00Z", "2023-08-20T12:30:00Z"),
        client(21, "Rekha", ClientType::Individual, "rekha@test.com", ClientStatus::Pending, "2022-11-20T15:00:00Z", "2023-05-10T11:00:00Z"),
        client(22, "Jaya", ClientType::Company, "jaya@corp.com", ClientStatus::Active, "2023-01-15T09:00:00Z", "2023-09-01T14:00:00Z"),
        client(23, "Sushma", ClientType::Company, "sushma@work.net", ClientStatus::Pending, "2024-03-10T18:00:00Z", "2024-03-10T18:00:00Z"),
    ];

    let state_dir = tempfile::tempdir().unwrap();
    let storage = FileStore::open(state_dir.path()).unwrap();

    let mut table = SortTableBuilder::new()
        .with_persistence(StoragePersistence::new(storage))
        .build(clients.clone())
        .unwrap();
    render("default", &table);

    table.add_criterion(ClientField::Status);
    table.set_direction(ClientField::Status, Direction::Asc);
    table.reorder(1, 0);
    render("status first", &table);

    let available = Vec::from_iter(table.available_fields().iter().map(|field| field.label()));
    println!("can still add: {}\n", available.join(", "));

    // a new session picks the stored specification up
    let restored = SortTableBuilder::new()
        .with_persistence(StoragePersistence::new(FileStore::open(state_dir.path()).unwrap()))
        .build(clients)
        .unwrap();
    render("restored", &restored);
}
