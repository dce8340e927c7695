use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct NewCounter {
    pub(crate) name: String,
    pub(crate) initialvalue: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddCounter {
    pub(crate) token: String,
    pub(crate) name: String,
    pub(crate) initialvalue: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenOnly {
    pub(crate) token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Lookup {
    pub(crate) token: String,
    pub(crate) name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Increment {
    pub(crate) token: String,
    pub(crate) name: Option<String>,
    pub(crate) increment: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Decrement {
    pub(crate) token: String,
    pub(crate) name: Option<String>,
    pub(crate) decrement: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Reset {
    pub(crate) token: String,
    pub(crate) name: Option<String>,
    pub(crate) initialvalue: Option<i64>,
}
