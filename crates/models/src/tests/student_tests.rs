use sea_orm::ActiveValue;
use uuid::Uuid;

use crate::student::Student;

#[test]
fn optional_fields_default_when_missing() {
    let id = Uuid::new_v4();
    let json = serde_json::json!({ "id": id, "name": "Ada" });
    let s: Student = serde_json::from_value(json).unwrap();
    assert_eq!(s.id, id);
    assert_eq!(s.name, "Ada");
    assert_eq!(s.email, None);
    assert_eq!(s.grade, None);
}

#[test]
fn active_model_marks_every_column_set() {
    let s = Student { id: Uuid::new_v4(), name: "Grace".into(), email: Some("g@example.com".into()), grade: Some(3) };
    let am = s.to_active_model();
    assert_eq!(am.id, ActiveValue::Set(s.id));
    assert_eq!(am.name, ActiveValue::Set("Grace".to_string()));
    assert_eq!(am.email, ActiveValue::Set(Some("g@example.com".to_string())));
    assert_eq!(am.grade, ActiveValue::Set(Some(3)));
}
