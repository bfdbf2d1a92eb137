use plaza_derive::wire_model;

#[wire_model]
pub struct PlayerQuery {
    pub user_id: String,
}

#[wire_model(deny_unknown_fields = true)]
pub struct StrictQuery {
    pub user_id: String,
}

fn main() {
    let query = PlayerQuery { user_id: "0xabc".to_owned() };
    let _ = query.clone();
}
