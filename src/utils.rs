use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use hashbrown::HashMap;

/// Mapping that computes missing entries with a per-key factory on first
/// access and returns the cached value on every access after that.
///
/// Accessors take `&self`; the cache lives behind a `RefCell` and is never
/// invalidated. Not thread-safe.
pub struct LazyMap<'a, V> {
    cache:   RefCell<HashMap<String, Rc<V>>>,
    factory: Box<dyn Fn(&str) -> Result<V> + 'a>,
}

impl<'a, V> LazyMap<'a, V> {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&str) -> Result<V> + 'a, {
        LazyMap {
            cache:   RefCell::new(HashMap::new()),
            factory: Box::new(factory),
        }
    }

    /// Cached value for `key`, built by the factory on the first miss.
    pub fn get(&self, key: &str) -> Result<Rc<V>> {
        if let Some(cached) = self.cache.borrow().get(key) {
            return Ok(Rc::clone(cached));
        }
        let value = Rc::new((self.factory)(key)?);
        self.cache
            .borrow_mut()
            .insert(key.to_owned(), Rc::clone(&value));
        Ok(value)
    }

    pub fn is_cached(&self, key: &str) -> bool {
        self.cache.borrow().contains_key(key)
    }
}

/// Name -> value map that remembers insertion order, so enumerating
/// annotations is deterministic and matches registration order.
#[derive(Debug, Clone)]
pub struct Registry<V> {
    order: Vec<String>,
    items: HashMap<String, V>,
}

impl<V> Default for Registry<V> {
    fn default() -> Self {
        Registry {
            order: Vec::new(),
            items: HashMap::new(),
        }
    }
}

impl<V> Registry<V> {
    pub fn new() -> Self { Self::default() }

    /// Insert under `name`, replacing and returning any previous value.
    /// Re-inserting keeps the original position in the enumeration order.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: V,
    ) -> Option<V> {
        let name = name.into();
        let previous = self.items.insert(name.clone(), value);
        if previous.is_none() {
            self.order.push(name);
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<&V> { self.items.get(name) }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.order
            .iter()
            .map(move |name| (name.as_str(), &self.items[name]))
    }

    pub fn len(&self) -> usize { self.order.len() }

    pub fn is_empty(&self) -> bool { self.order.is_empty() }
}

/// RGBA color with 8-bit channels and a unit-interval alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const fn rgb(
        r: u8,
        g: u8,
        b: u8,
    ) -> Color {
        Color { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(
        self,
        a: f64,
    ) -> Color {
        Color { a, ..self }
    }

    /// Parse `RRGGBB`, `#RRGGBB` or `#RRGGBBAA`.
    pub fn from_hex(hex: &str) -> Result<Color> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        // Plain hex digits only; from_str_radix alone would also take
        // signs, and byte-length checks alone would slice inside
        // multi-byte characters.
        if (digits.len() != 6 && digits.len() != 8)
            || !digits.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(anyhow!("malformed hex color: {}", hex));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| anyhow!("malformed hex color: {}", hex))
        };
        let mut color = Color::rgb(channel(0)?, channel(2)?, channel(4)?);
        if digits.len() == 8 {
            color.a = channel(6)? as f64 / 255.0;
        }
        Ok(color)
    }

    /// Parse a named color or a hex string.
    pub fn parse(value: &str) -> Result<Color> {
        match value {
            "red" => Ok(Color::rgb(255, 0, 0)),
            "green" => Ok(Color::rgb(0, 128, 0)),
            "blue" => Ok(Color::rgb(0, 0, 255)),
            "black" => Ok(Color::rgb(0, 0, 0)),
            "white" => Ok(Color::rgb(255, 255, 255)),
            "yellow" => Ok(Color::rgb(255, 255, 0)),
            "cyan" => Ok(Color::rgb(0, 255, 255)),
            "magenta" => Ok(Color::rgb(255, 0, 255)),
            "orange" => Ok(Color::rgb(255, 165, 0)),
            "gray" | "grey" => Ok(Color::rgb(128, 128, 128)),
            hex => Color::from_hex(hex),
        }
    }
}
