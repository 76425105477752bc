use pretty_assertions::assert_eq;
use quarry_core::{
    driver::Connection as _,
    schema::TableMetadata,
    stmt::{Statement, Value},
};
use quarry_driver_sqlite::{Connection, Sqlite};

async fn user_table() -> Connection {
    let connection = Sqlite::in_memory().connect().unwrap();
    connection
        .exec(&Statement::raw(
            "CREATE TABLE user (uid INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT, score REAL, avatar BLOB)",
        ))
        .await
        .unwrap();
    connection
}

#[test]
fn parse_url() {
    assert_eq!(Sqlite::new("sqlite::memory:").unwrap(), Sqlite::InMemory);
    assert_eq!(
        Sqlite::new("sqlite:/tmp/quarry.db").unwrap(),
        Sqlite::open("/tmp/quarry.db")
    );
    assert!(Sqlite::new("mysql://localhost/db")
        .unwrap_err()
        .is_invalid_connection_url());
    assert!(Sqlite::new("not a url").unwrap_err().is_invalid_connection_url());
}

#[tokio::test]
async fn describe_reads_create_statement() {
    let connection = user_table().await;

    let TableMetadata::CreateStatement(sql) = connection.describe_table("user").await.unwrap() else {
        panic!("expected a create statement");
    };
    assert!(sql.contains("AUTOINCREMENT"));

    let err = connection.describe_table("missing").await.unwrap_err();
    assert!(err.is_invalid_schema());
}

#[tokio::test]
async fn insert_reports_rowid_and_count() {
    let connection = user_table().await;

    let insert = Statement::new(
        "INSERT INTO user (name, score, avatar) VALUES (?, ?, ?)",
        vec![Value::from("jet"), Value::F64(1.5), Value::Bytes(vec![1, 2])],
    );
    let response = connection.exec(&insert).await.unwrap();
    assert_eq!(response.rows_affected, Some(1));
    assert_eq!(response.last_insert_id, Some(1));

    let response = connection
        .exec(&Statement::new(
            "UPDATE user SET name = ? WHERE uid > ?",
            vec![Value::from("jet2"), Value::I64(0)],
        ))
        .await
        .unwrap();
    assert_eq!(response.rows_affected, Some(1));
    assert_eq!(response.last_insert_id, None);
}

#[tokio::test]
async fn query_returns_storage_classes() {
    let connection = user_table().await;
    connection
        .exec(&Statement::new(
            "INSERT INTO user (name, score, avatar) VALUES (?, ?, ?)",
            vec![Value::from("jet"), Value::Null, Value::Bytes(vec![7])],
        ))
        .await
        .unwrap();

    let rows = connection
        .query(&Statement::raw("SELECT uid, name, score, avatar FROM user"))
        .await
        .unwrap();

    assert_eq!(rows.columns, ["uid", "name", "score", "avatar"]);
    assert_eq!(
        rows.rows,
        vec![vec![
            Value::I64(1),
            Value::from("jet"),
            Value::Null,
            Value::Bytes(vec![7])
        ]]
    );
}

#[tokio::test]
async fn errors_are_driver_failures() {
    let connection = user_table().await;
    let err = connection
        .query(&Statement::raw("SELECT nope FROM user"))
        .await
        .unwrap_err();
    assert!(err.is_driver_operation_failed());

    connection
        .exec(&Statement::raw("CREATE UNIQUE INDEX user_name ON user (name)"))
        .await
        .unwrap();
    let insert = Statement::new("INSERT INTO user (name) VALUES (?)", vec![Value::from("a")]);
    connection.exec(&insert).await.unwrap();
    let err = connection.exec(&insert).await.unwrap_err();
    assert!(err.is_duplicate_key());
}
