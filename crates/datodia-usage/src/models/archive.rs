#[derive(Debug)]
pub struct Archive {
    pub id: i32,
}
