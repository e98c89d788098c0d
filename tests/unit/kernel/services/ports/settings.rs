use super::*;

#[test]
fn tab_switch_policy_is_lowercase_in_json() {
    let session: SessionSettings =
        serde_json::from_str(r#"{"tab_switch":"refetch","strict_versioning":true}"#).unwrap();
    assert_eq!(session.tab_switch, TabSwitchPolicy::Refetch);
    assert!(session.strict_versioning);
    assert_eq!(session.max_notifications, 64);

    let json = serde_json::to_value(SessionSettings::default()).unwrap();
    assert_eq!(json["tab_switch"], "retain");
}

#[test]
fn empty_object_yields_defaults() {
    let settings: Settings = serde_json::from_str("{}").unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.remote.token_env, "GITHUB_TOKEN");
    assert_eq!(settings.remote.api_version, "2022-11-28");
    assert_eq!(settings.preview.target, "frontend");
    assert!(settings.preview.endpoint.is_none());
}

#[test]
fn unset_branch_is_not_serialized() {
    let json = serde_json::to_value(RemoteSettings::default()).unwrap();
    assert!(json.get("branch").is_none());
}
