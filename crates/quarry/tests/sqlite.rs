use pretty_assertions::assert_eq;
use quarry::{Connection as _, Db, Direction, Embed, Record, Statement, Value};

const USER_TABLE: &str = "CREATE TABLE user (
    uid INTEGER PRIMARY KEY AUTOINCREMENT,
    gid INTEGER NOT NULL DEFAULT 0,
    name TEXT NOT NULL DEFAULT ''
)";

#[derive(Debug, Default, Clone, PartialEq, Record)]
struct User {
    #[column("uid")]
    uid: i64,

    #[column("gid")]
    gid: i64,

    #[column("name")]
    name: String,
}

fn user(uid: i64, gid: i64, name: &str) -> User {
    User {
        uid,
        gid,
        name: name.to_string(),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn setup(cache: bool) -> Db {
    init_tracing();
    let db = Db::builder().connect("sqlite::memory:").await.unwrap();
    db.execute(USER_TABLE, ()).await.unwrap();
    db.bind::<User>("user", cache).await.unwrap();
    db
}

async fn insert_users(db: &Db, gids: &[i64]) {
    for (i, gid) in gids.iter().enumerate() {
        let mut record = user(0, *gid, &format!("jet{i}"));
        db.table::<User>("user").insert(&mut record).await.unwrap();
    }
}

#[tokio::test]
async fn crud_by_primary_key() {
    for cache in [false, true] {
        let db = setup(cache).await;

        let mut record = user(1, 1, "jet");
        let id = db.table::<User>("user").insert(&mut record).await.unwrap();
        assert_eq!(id, 1);
        assert_eq!(record.uid, 1);

        let found = db.table::<User>("user").filter_pk(1).one().await.unwrap();
        assert_eq!(found, user(1, 1, "jet"));

        let affected = db
            .table::<User>("user")
            .update(&user(1, 2, "jet2"))
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let found = db.table::<User>("user").filter_pk(1).one().await.unwrap();
        assert_eq!(found, user(1, 2, "jet2"));

        let deleted = db.table::<User>("user").filter_pk(1).delete().await.unwrap();
        assert_eq!(deleted, 1);

        let err = db.table::<User>("user").filter_pk(1).one().await.unwrap_err();
        assert!(err.is_record_not_found(), "cache={cache}; err={err}");
    }
}

#[tokio::test]
async fn auto_increment_is_written_back() {
    let db = setup(true).await;

    let mut first = user(0, 7, "a");
    let mut second = user(0, 7, "b");
    db.table::<User>("user").insert(&mut first).await.unwrap();
    db.table::<User>("user").insert(&mut second).await.unwrap();

    assert_eq!((first.uid, second.uid), (1, 2));
    assert_eq!(
        db.all_from_cache::<User>("user").unwrap().into_keys().collect::<Vec<_>>(),
        ["1", "2"]
    );
}

#[tokio::test]
async fn partial_update_assigns_backend_and_cache() {
    let db = setup(true).await;
    insert_users(&db, &[1, 2, 3, 4]).await;

    let affected = db
        .table::<User>("user")
        .filter("uid>? AND gid>?", (0, 0))
        .set("name", "jet3")
        .update_partial()
        .await
        .unwrap();
    assert_eq!(affected, 4);

    let rows = db.query("SELECT name FROM user ORDER BY uid", ()).await.unwrap();
    assert_eq!(rows.rows, vec![vec![Value::from("jet3")]; 4]);

    for uid in 1..=4 {
        let cached = db.table::<User>("user").filter_pk(uid).one().await.unwrap();
        assert_eq!(cached.name, "jet3");
    }
}

#[tokio::test]
async fn increment_matches_backend() {
    let db = setup(true).await;
    insert_users(&db, &[1, 2, 3, 4]).await;

    db.table::<User>("user")
        .filter("gid>=?", 3)
        .set("gid+", 10)
        .update_partial()
        .await
        .unwrap();

    let cached = db.all_from_cache::<User>("user").unwrap();

    db.disable_cache("user");
    let backend = db.table::<User>("user").sort("uid", Direction::Asc).all().await.unwrap();

    assert_eq!(
        backend.iter().map(|u| u.gid).collect::<Vec<_>>(),
        [1, 2, 13, 14]
    );
    assert_eq!(cached.into_values().collect::<Vec<_>>(), backend);
}

#[tokio::test]
async fn primary_key_is_never_assigned() {
    let db = setup(false).await;
    insert_users(&db, &[5]).await;

    db.table::<User>("user")
        .filter_pk(1)
        .set("uid", 99)
        .set("gid*", 3)
        .update_partial()
        .await
        .unwrap();

    let found = db.table::<User>("user").filter_pk(1).one().await.unwrap();
    assert_eq!(found.gid, 15);
}

#[tokio::test]
async fn unknown_partial_update_column() {
    let db = setup(false).await;

    let err = db
        .table::<User>("user")
        .set("nope", 1)
        .update_partial()
        .await
        .unwrap_err();
    assert!(err.is_invalid_statement());
}

#[tokio::test]
async fn aggregates() {
    let db = setup(false).await;
    insert_users(&db, &[1, 2, 3, 4, 222]).await;

    let table = || db.table::<User>("user");
    assert_eq!(table().min("gid").await.unwrap(), 1);
    assert_eq!(table().max("gid").await.unwrap(), 222);
    assert_eq!(table().sum("gid").await.unwrap(), 232);
    assert_eq!(table().sum("gid*2").await.unwrap(), 464);
    assert_eq!(table().count().await.unwrap(), 5);
    assert_eq!(table().filter("gid>?", 2).count().await.unwrap(), 3);
    assert_eq!(table().filter("gid>?", 1000).max("gid").await.unwrap(), 0);
}

#[tokio::test]
async fn cached_count_uses_cache_size() {
    let db = setup(true).await;
    insert_users(&db, &[1, 2]).await;

    // rows written behind the cache's back are invisible to an unfiltered
    // count but not to a filtered one
    db.execute("INSERT INTO user (gid, name) VALUES (?, ?)", (9, "raw"))
        .await
        .unwrap();

    assert_eq!(db.table::<User>("user").count().await.unwrap(), 2);
    assert_eq!(db.table::<User>("user").filter("uid>?", 0).count().await.unwrap(), 3);
}

#[tokio::test]
async fn cached_point_reads_are_strict() {
    let db = setup(true).await;

    db.execute("INSERT INTO user (uid, gid, name) VALUES (?, ?, ?)", (5, 1, "raw"))
        .await
        .unwrap();

    let err = db.table::<User>("user").filter_pk(5).one().await.unwrap_err();
    assert!(err.is_record_not_found());

    let found = db.table::<User>("user").filter_eq("name", "raw").one().await.unwrap();
    assert_eq!(found, user(5, 1, "raw"));

    db.load_cache::<User>("user").await.unwrap();
    let found = db.table::<User>("user").filter_pk(5).one().await.unwrap();
    assert_eq!(found.name, "raw");
}

#[tokio::test]
async fn reload_reproduces_key_set() {
    let db = setup(true).await;
    insert_users(&db, &[1, 2, 3]).await;
    db.table::<User>("user").filter_pk(2).delete().await.unwrap();

    let before = db.all_from_cache::<User>("user").unwrap();

    db.disable_cache("user");
    assert_eq!(db.cache_len("user"), None);
    assert!(db.all_from_cache::<User>("user").is_none());

    db.enable_cache::<User>("user").await.unwrap();
    let after = db.all_from_cache::<User>("user").unwrap();
    assert_eq!(before, after);

    let scanned = db
        .table::<User>("user")
        .all()
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.uid.to_string())
        .collect::<Vec<_>>();
    assert_eq!(after.into_keys().collect::<Vec<_>>(), scanned);
}

#[tokio::test]
async fn empty_delete_truncates() {
    let db = setup(true).await;
    insert_users(&db, &[1, 2, 3]).await;

    db.table::<User>("user").delete().await.unwrap();

    assert_eq!(db.cache_len("user"), Some(0));
    let err = db.table::<User>("user").all().await.unwrap_err();
    assert!(err.is_record_not_found());

    let rows = db.query("SELECT COUNT(*) FROM user", ()).await.unwrap();
    assert_eq!(rows.into_scalar(), Some(Value::I64(0)));
}

#[tokio::test]
async fn filtered_delete_updates_cache() {
    let db = setup(true).await;
    insert_users(&db, &[1, 2, 3, 4]).await;

    let deleted = db.table::<User>("user").filter("gid<?", 3).delete().await.unwrap();
    assert_eq!(deleted, 2);
    assert_eq!(
        db.all_from_cache::<User>("user").unwrap().into_keys().collect::<Vec<_>>(),
        ["3", "4"]
    );
}

async fn backend_users(db: &Db) -> Vec<User> {
    db.table::<User>("user")
        .filter("uid>?", 0)
        .sort("uid", Direction::Asc)
        .all()
        .await
        .unwrap()
}

#[tokio::test]
async fn limited_delete_removes_only_the_window() {
    for cache in [false, true] {
        let db = setup(cache).await;
        insert_users(&db, &[1, 2, 3, 4]).await;

        let deleted = db
            .table::<User>("user")
            .filter("gid>?", 0)
            .sort("gid", Direction::Desc)
            .limit(1, None)
            .delete()
            .await
            .unwrap();
        assert_eq!(deleted, 1);

        let rows = db.query("SELECT uid FROM user ORDER BY uid", ()).await.unwrap();
        assert_eq!(
            rows.rows,
            vec![vec![Value::I64(1)], vec![Value::I64(2)], vec![Value::I64(3)]]
        );

        if cache {
            assert_eq!(
                db.all_from_cache::<User>("user").unwrap().into_keys().collect::<Vec<_>>(),
                ["1", "2", "3"]
            );
            let err = db.table::<User>("user").filter_pk(4).one().await.unwrap_err();
            assert!(err.is_record_not_found());
        }
    }
}

#[tokio::test]
async fn limited_update_changes_only_the_window() {
    for cache in [false, true] {
        let db = setup(cache).await;
        insert_users(&db, &[1, 2, 3, 4]).await;

        let affected = db
            .table::<User>("user")
            .filter("gid>?", 0)
            .sort("gid", Direction::Asc)
            .limit(1, Some(2))
            .set("name", "x")
            .set("gid+", 10)
            .update_partial()
            .await
            .unwrap();
        assert_eq!(affected, 2);

        let cached = db.all_from_cache::<User>("user");
        db.disable_cache("user");
        let backend = backend_users(&db).await;

        assert_eq!(
            backend,
            [
                user(1, 1, "jet0"),
                user(2, 12, "x"),
                user(3, 13, "x"),
                user(4, 4, "jet3"),
            ]
        );

        if let Some(cached) = cached {
            assert_eq!(cached.into_values().collect::<Vec<_>>(), backend);
        }
    }
}

#[tokio::test]
async fn unrepresentable_cached_update_writes_nothing() {
    let db = setup(true).await;
    insert_users(&db, &[1, 2]).await;

    let err = db
        .table::<User>("user")
        .filter("gid>?", 0)
        .set("gid+", 1.5f64)
        .update_partial()
        .await
        .unwrap_err();
    assert!(err.is_type_conversion());

    let rows = db.query("SELECT gid FROM user ORDER BY uid", ()).await.unwrap();
    assert_eq!(rows.rows, vec![vec![Value::I64(1)], vec![Value::I64(2)]]);

    let cached = db.all_from_cache::<User>("user").unwrap();
    assert_eq!(
        cached.into_values().map(|u| u.gid).collect::<Vec<_>>(),
        [1, 2]
    );
}

#[tokio::test]
async fn zero_limit_is_unlimited() {
    let db = setup(false).await;
    insert_users(&db, &[1, 2, 3]).await;

    let users = db.table::<User>("user").limit(0, None).all().await.unwrap();
    assert_eq!(users.len(), 3);
}

#[tokio::test]
async fn insert_ignore_keeps_original() {
    let db = setup(true).await;
    insert_users(&db, &[1]).await;

    let mut dup = user(1, 42, "dup");
    let inserted = db.table::<User>("user").insert_ignore(&mut dup).await.unwrap();
    // the auto-increment column is not written, so this is a fresh row
    assert!(inserted);
    assert_eq!(dup.uid, 2);

    db.execute("CREATE UNIQUE INDEX user_name ON user (name)", ())
        .await
        .unwrap();

    let mut dup = user(0, 42, "jet0");
    let inserted = db.table::<User>("user").insert_ignore(&mut dup).await.unwrap();
    assert!(!inserted);

    let original = db.table::<User>("user").filter_pk(1).one().await.unwrap();
    assert_eq!(original, user(1, 1, "jet0"));
    assert_eq!(db.cache_len("user"), Some(2));
}

#[tokio::test]
async fn replace_overwrites_row() {
    let db = setup(true).await;
    insert_users(&db, &[1]).await;

    db.table::<User>("user").replace(&user(1, 5, "swapped")).await.unwrap();

    let cached = db.table::<User>("user").filter_pk(1).one().await.unwrap();
    db.disable_cache("user");
    let stored = db.table::<User>("user").filter_pk(1).one().await.unwrap();
    assert_eq!(cached, stored);
    assert_eq!(stored, user(1, 5, "swapped"));
}

#[tokio::test]
async fn sort_limit_and_fields() {
    let db = setup(false).await;
    insert_users(&db, &[10, 30, 20, 40]).await;

    let page = db
        .table::<User>("user")
        .sort("gid", Direction::Desc)
        .limit(1, Some(2))
        .all()
        .await
        .unwrap();
    assert_eq!(page.iter().map(|u| u.gid).collect::<Vec<_>>(), [30, 20]);

    let first = db
        .table::<User>("user")
        .sort_by([("gid", Direction::Asc)])
        .limit(1, None)
        .all()
        .await
        .unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].gid, 10);

    let names_only = db
        .table::<User>("user")
        .fields(["name"])
        .filter_pk(2)
        .one()
        .await
        .unwrap();
    assert_eq!(names_only, user(0, 0, "jet1"));
}

#[tokio::test]
async fn or_filter_combines_with_equality() {
    let db = setup(false).await;
    insert_users(&db, &[1, 2, 3]).await;

    let found = db
        .table::<User>("user")
        .filter("gid=?", 1)
        .or_filter("gid=?", 3)
        .filter_eq("name", "jet2")
        .all()
        .await
        .unwrap();
    assert_eq!(found, vec![user(3, 3, "jet2")]);
}

#[tokio::test]
async fn no_rows_is_not_found() {
    let db = setup(false).await;

    let err = db.table::<User>("user").filter("gid>?", 0).all().await.unwrap_err();
    assert!(err.is_record_not_found());

    let err = db.table::<User>("user").filter_pk(3).one().await.unwrap_err();
    assert!(err.is_record_not_found());
}

#[tokio::test]
async fn bad_primary_key_arguments() {
    let db = setup(true).await;

    let err = db
        .table::<User>("user")
        .filter_pk(Value::Null)
        .one()
        .await
        .unwrap_err();
    assert!(err.is_invalid_statement());

    let err = db.table::<User>("user").filter_pk((1, 2)).one().await.unwrap_err();
    assert!(err.is_invalid_statement());
}

#[tokio::test]
async fn missing_table_is_schema_error() {
    let db = setup(false).await;

    let err = db.bind::<User>("nope", false).await.unwrap_err();
    assert!(err.is_invalid_schema());

    let err = db.table::<User>("nope").count().await.unwrap_err();
    assert!(err.is_invalid_schema());
}

#[tokio::test]
async fn implicit_bind() {
    init_tracing();
    let db = Db::builder().connect("sqlite::memory:").await.unwrap();
    db.execute(USER_TABLE, ()).await.unwrap();
    assert!(db.schema("user").is_none());

    insert_users(&db, &[1]).await;

    let schema = db.schema("user").unwrap();
    assert_eq!(schema.primary_key, ["uid"]);
    assert_eq!(schema.auto_increment.as_deref(), Some("uid"));
    assert_eq!(db.cache_len("user"), None);
}

#[tokio::test]
async fn read_only_writes_are_no_ops() {
    let db = setup(true).await;
    insert_users(&db, &[1]).await;

    db.set_read_only(true);
    assert!(db.is_read_only());

    let mut record = user(0, 2, "ro");
    assert_eq!(db.table::<User>("user").insert(&mut record).await.unwrap(), 0);
    assert_eq!(db.table::<User>("user").update(&user(1, 9, "ro")).await.unwrap(), 0);
    assert_eq!(db.table::<User>("user").truncate().await.unwrap(), 0);
    assert_eq!(db.execute("DELETE FROM user", ()).await.unwrap(), 0);

    db.set_read_only(false);
    db.disable_cache("user");
    assert_eq!(db.table::<User>("user").count().await.unwrap(), 1);
    assert_eq!(
        db.table::<User>("user").filter_pk(1).one().await.unwrap(),
        user(1, 1, "jet0")
    );
}

#[derive(Debug, Default, Clone, PartialEq, Embed)]
struct Profile {
    #[column("age")]
    age: Option<i32>,

    #[column("city")]
    city: String,
}

#[derive(Debug, Default, Clone, PartialEq, Record)]
struct Member {
    #[column("id")]
    id: String,

    #[column("joined")]
    joined: jiff::civil::DateTime,

    #[column("note")]
    note: Option<String>,

    profile: Profile,

    // not a column
    scratch: u8,
}

#[tokio::test]
async fn embedded_and_optional_fields() {
    init_tracing();
    let conn = quarry_driver_sqlite::Connection::in_memory().unwrap();
    conn.exec(&Statement::raw(
        "CREATE TABLE member (id TEXT, joined TEXT, note TEXT, age INTEGER, city TEXT, PRIMARY KEY (id))",
    ))
    .await
    .unwrap();

    let db = Db::builder()
        .bind::<Member>("member", true)
        .build(conn)
        .await
        .unwrap();

    let schema = db.schema("member").unwrap();
    assert_eq!(
        schema.column_names().collect::<Vec<_>>(),
        ["id", "joined", "note", "age", "city"]
    );
    assert_eq!(schema.column("age").unwrap().field, "profile.age");

    let mut member = Member {
        id: "m-1".to_string(),
        joined: jiff::civil::date(2024, 3, 9).at(8, 30, 0, 0),
        note: None,
        profile: Profile {
            age: Some(33),
            city: "Oslo".to_string(),
        },
        scratch: 7,
    };
    db.table::<Member>("member").insert(&mut member).await.unwrap();

    let rows = db.query("SELECT joined, note FROM member", ()).await.unwrap();
    assert_eq!(
        rows.rows,
        vec![vec![Value::from("2024-03-09 08:30:00"), Value::Null]]
    );

    db.disable_cache("member");
    let loaded = db.table::<Member>("member").filter_pk("m-1").one().await.unwrap();
    assert_eq!(loaded, Member { scratch: 0, ..member.clone() });

    db.table::<Member>("member")
        .filter_pk("m-1")
        .set("note", "hi")
        .set("age+", 1)
        .update_partial()
        .await
        .unwrap();

    let loaded = db.table::<Member>("member").filter_pk("m-1").one().await.unwrap();
    assert_eq!(loaded.note.as_deref(), Some("hi"));
    assert_eq!(loaded.profile.age, Some(34));
}

#[tokio::test]
async fn type_mismatch_names_the_column() {
    let db = setup(false).await;
    db.execute("INSERT INTO user (gid, name) VALUES (?, ?)", ("many", "x"))
        .await
        .unwrap();

    let err = db.table::<User>("user").filter_pk(1).one().await.unwrap_err();
    assert!(err.is_type_conversion(), "{err}");
    assert!(err.to_string().contains("gid"), "{err}");
}

#[tokio::test]
async fn unsupported_scheme() {
    let err = Db::builder().connect("postgres://localhost/db").await.unwrap_err();
    assert!(err.is_invalid_connection_url());

    let err = Db::builder().connect("not a url").await.unwrap_err();
    assert!(err.is_invalid_connection_url());
}
