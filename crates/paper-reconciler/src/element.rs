/// A declarative node: tag, optional key, props and children.
#[derive(Clone, Debug, PartialEq)]
pub struct Element<T, P> {
    pub ty: T,
    pub key: Option<String>,
    pub props: P,
    pub children: Vec<Child<T, P>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Child<T, P> {
    Element(Element<T, P>),
    Text(String),
}

impl<T, P> Element<T, P> {
    pub fn new(ty: impl Into<T>, props: P) -> Self {
        Self {
            ty: ty.into(),
            key: None,
            props,
            children: Vec::new(),
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn child(mut self, child: impl Into<Child<T, P>>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<C: Into<Child<T, P>>>(mut self, children: impl IntoIterator<Item = C>) -> Self {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }
}

impl<T, P> From<Element<T, P>> for Child<T, P> {
    fn from(element: Element<T, P>) -> Self {
        Child::Element(element)
    }
}

impl<T, P> From<&str> for Child<T, P> {
    fn from(text: &str) -> Self {
        Child::Text(text.to_owned())
    }
}

impl<T, P> From<String> for Child<T, P> {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}
