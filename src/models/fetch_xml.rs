//! Structured FetchXML query model
//!
//! Queries are built as plain values and serialized to FetchXML only at the
//! request boundary. Every value is escaped on the way out, so user input can
//! never alter the query structure.

/// Comparison operator for a filter condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionOperator {
    Equals,
    Like,
}

impl ConditionOperator {
    pub fn as_fetch_xml(&self) -> &'static str {
        match self {
            Self::Equals => "eq",
            Self::Like => "like",
        }
    }
}

/// A single `<condition>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub attribute: String,
    pub operator: ConditionOperator,
    pub value: String,
}

impl Condition {
    /// Exact match on an attribute
    pub fn equals(attribute: &str, value: &str) -> Self {
        Self {
            attribute: attribute.to_string(),
            operator: ConditionOperator::Equals,
            value: value.to_string(),
        }
    }

    /// Substring match; wildcard characters in `term` match literally
    pub fn contains(attribute: &str, term: &str) -> Self {
        Self {
            attribute: attribute.to_string(),
            operator: ConditionOperator::Like,
            value: format!("%{}%", escape_like(term)),
        }
    }
}

/// A `<filter>` element; conditions are combined with `and`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub conditions: Vec<Condition>,
}

impl Filter {
    pub fn new(condition: Condition) -> Self {
        Self {
            conditions: vec![condition],
        }
    }
}

/// An `<order>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub attribute: String,
    pub descending: bool,
}

/// A `<link-entity>` join
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntity {
    /// Logical name of the joined entity
    pub name: String,
    /// Column on the joined entity
    pub from: String,
    /// Column on the parent entity
    pub to: String,
    pub alias: Option<String>,
    pub intersect: bool,
    pub attributes: Vec<String>,
    pub filter: Option<Filter>,
    pub links: Vec<LinkEntity>,
}

impl LinkEntity {
    pub fn new(name: &str, from: &str, to: &str) -> Self {
        Self {
            name: name.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            alias: None,
            intersect: false,
            attributes: Vec::new(),
            filter: None,
            links: Vec::new(),
        }
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub fn intersect(mut self) -> Self {
        self.intersect = true;
        self
    }

    pub fn attribute(mut self, name: &str) -> Self {
        self.attributes.push(name.to_string());
        self
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.filter = Some(Filter::new(condition));
        self
    }

    pub fn link(mut self, link: LinkEntity) -> Self {
        self.links.push(link);
        self
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str("<link-entity");
        push_attr(out, "name", &self.name);
        push_attr(out, "from", &self.from);
        push_attr(out, "to", &self.to);
        if let Some(alias) = &self.alias {
            push_attr(out, "alias", alias);
        }
        if self.intersect {
            push_attr(out, "intersect", "true");
        }
        out.push('>');
        write_attributes(out, &self.attributes);
        for link in &self.links {
            link.write_xml(out);
        }
        if let Some(filter) = &self.filter {
            write_filter(out, filter);
        }
        out.push_str("</link-entity>");
    }
}

/// The root `<entity>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchEntity {
    pub name: String,
    pub attributes: Vec<String>,
    pub orders: Vec<Order>,
    pub filter: Option<Filter>,
    pub links: Vec<LinkEntity>,
}

/// A complete FetchXML query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchQuery {
    pub distinct: bool,
    pub entity: FetchEntity,
}

impl FetchQuery {
    /// Start a distinct query rooted at `entity`
    pub fn new(entity: &str) -> Self {
        Self {
            distinct: true,
            entity: FetchEntity {
                name: entity.to_string(),
                attributes: Vec::new(),
                orders: Vec::new(),
                filter: None,
                links: Vec::new(),
            },
        }
    }

    pub fn attribute(mut self, name: &str) -> Self {
        self.entity.attributes.push(name.to_string());
        self
    }

    pub fn order_ascending(mut self, attribute: &str) -> Self {
        self.entity.orders.push(Order {
            attribute: attribute.to_string(),
            descending: false,
        });
        self
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.entity.filter = Some(Filter::new(condition));
        self
    }

    pub fn link(mut self, link: LinkEntity) -> Self {
        self.entity.links.push(link);
        self
    }

    /// Serialize to the FetchXML wire format
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(512);
        out.push_str("<fetch");
        if self.distinct {
            push_attr(&mut out, "distinct", "true");
        }
        out.push('>');

        out.push_str("<entity");
        push_attr(&mut out, "name", &self.entity.name);
        out.push('>');
        write_attributes(&mut out, &self.entity.attributes);
        for order in &self.entity.orders {
            out.push_str("<order");
            push_attr(&mut out, "attribute", &order.attribute);
            if order.descending {
                push_attr(&mut out, "descending", "true");
            }
            out.push_str(" />");
        }
        for link in &self.entity.links {
            link.write_xml(&mut out);
        }
        if let Some(filter) = &self.entity.filter {
            write_filter(&mut out, filter);
        }
        out.push_str("</entity></fetch>");
        out
    }
}

fn write_attributes(out: &mut String, attributes: &[String]) {
    for attribute in attributes {
        out.push_str("<attribute");
        push_attr(out, "name", attribute);
        out.push_str(" />");
    }
}

fn write_filter(out: &mut String, filter: &Filter) {
    out.push_str("<filter>");
    for condition in &filter.conditions {
        out.push_str("<condition");
        push_attr(out, "attribute", &condition.attribute);
        push_attr(out, "operator", condition.operator.as_fetch_xml());
        push_attr(out, "value", &condition.value);
        out.push_str(" />");
    }
    out.push_str("</filter>");
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&xml_escape(value));
    out.push('"');
}

fn xml_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            _ => result.push(c),
        }
    }
    result
}

/// Bracket-escape LIKE wildcards so they match literally
fn escape_like(term: &str) -> String {
    let mut result = String::with_capacity(term.len());
    for c in term.chars() {
        match c {
            '%' => result.push_str("[%]"),
            '_' => result.push_str("[_]"),
            '[' => result.push_str("[[]"),
            _ => result.push(c),
        }
    }
    result
}
