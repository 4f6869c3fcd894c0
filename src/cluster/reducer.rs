use crate::{Error, Result, resp::Response};
use std::collections::HashMap;

/// Folds the ordered partial replies of a fan-out dispatch into one reply.
///
/// Invoked only when every partial succeeded; the partial order is the
/// sub-request issue order.
pub type Reducer = Box<dyn Fn(Vec<Response>) -> Result<Response> + Send + Sync>;

/// Per-command reply reducers.
///
/// Captured by the router at construction; read-only afterwards, so
/// steady-state lookups need no synchronization.
pub struct ReducerRegistry {
    reducers: HashMap<String, Reducer>,
}

impl ReducerRegistry {
    /// Registry with the built-in reducers of the fan-out commands
    pub fn with_builtins() -> Self {
        let mut registry = Self {
            reducers: HashMap::new(),
        };

        registry.register("MSET", |_| Ok(Response::ok()));
        registry.register("FLUSHDB", |_| Ok(Response::ok()));
        for name in ["DEL", "DBSIZE", "EXISTS", "UNLINK", "TOUCH"] {
            registry.register(name, sum_integers);
        }
        for name in ["MGET", "KEYS"] {
            registry.register(name, concat_arrays);
        }

        registry
    }

    /// Registers `reducer` for the command `name`, replacing any previous one
    pub fn register<F>(&mut self, name: impl Into<String>, reducer: F)
    where
        F: Fn(Vec<Response>) -> Result<Response> + Send + Sync + 'static,
    {
        let mut name = name.into();
        name.make_ascii_uppercase();
        self.reducers.insert(name, Box::new(reducer));
    }

    pub fn get(&self, name: &str) -> Option<&Reducer> {
        self.reducers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.reducers.contains_key(name)
    }
}

impl Default for ReducerRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Sums integer partials, e.g. the deletion counts of a scattered `DEL`
fn sum_integers(partials: Vec<Response>) -> Result<Response> {
    let mut sum = 0i64;

    for partial in partials {
        match partial {
            Response::Integer(i) => sum += i,
            _ => {
                return Err(Error::Client(format!("Unexpected value {partial:?}")));
            }
        }
    }

    Ok(Response::Integer(sum))
}

/// Concatenates array partials in input order, e.g. the per-slot rows
/// of a scattered `MGET`
fn concat_arrays(partials: Vec<Response>) -> Result<Response> {
    let mut values = Vec::new();

    for partial in partials {
        match partial {
            Response::Array(v) => values.extend(v),
            _ => {
                return Err(Error::Client(format!("Unexpected value {partial:?}")));
            }
        }
    }

    Ok(Response::Array(values))
}
