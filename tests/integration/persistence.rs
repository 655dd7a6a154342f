//! Data survives reopening the database file

use super::common::fixtures::temp_database;
use taskdesk::{AuthService, Database, NewTask, TaskQuery, TaskStore};

#[test]
fn test_reopen_keeps_users_tasks_and_sessions() {
    let (db, dir) = temp_database();
    let auth = AuthService::new(db.clone(), 24);
    let user = auth.register("dana", "secret1", "secret1").unwrap();
    let issued = auth.login("dana", "secret1").unwrap();
    TaskStore::new(db.clone())
        .create(user.id, &NewTask::new("Persist me").with_description("please"))
        .unwrap();
    drop(auth);
    drop(db);

    let db = Database::open(dir.path().join("taskdesk.db")).expect("reopen");
    let auth = AuthService::new(db.clone(), 24);
    let current = auth
        .authenticate(&issued.token)
        .unwrap()
        .expect("session survives reopen");
    assert_eq!(current.id, user.id);

    let page = TaskStore::new(db)
        .list_for_user(user.id, &TaskQuery::default())
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.tasks[0].title, "Persist me");
    assert_eq!(page.tasks[0].description.as_deref(), Some("please"));
}

#[test]
fn test_logout_revokes_token() {
    let (db, _dir) = temp_database();
    let auth = AuthService::new(db, 24);
    auth.register("erin", "secret1", "secret1").unwrap();
    let issued = auth.login("erin", "secret1").unwrap();

    auth.logout(&issued.token).unwrap();

    assert!(auth.authenticate(&issued.token).unwrap().is_none());
}
