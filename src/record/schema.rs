use crate::convert::format::FormatTemplate;
use crate::convert::FieldKind;
use crate::convert::FieldValue;
use crate::record::FieldType;
use std::collections::HashMap;

type Reader<T> = Box<dyn Fn(&T) -> FieldValue + Send + Sync>;
type Writer<T> = Box<dyn Fn(&mut T, FieldValue) + Send + Sync>;

/// A record member bound to a column.
pub struct FieldDescriptor<T> {
    member: &'static str,
    title: Option<String>,
    required: bool,
    format: Option<FormatTemplate>,
    kind: FieldKind,
    read: Reader<T>,
    write: Writer<T>,
}

impl<T> FieldDescriptor<T> {
    /// Member name of the field.
    pub fn member(&self) -> &'static str {
        self.member
    }

    /// Explicit column title, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns true if a missing or empty value invalidates the record.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Output template applied on save.
    pub fn format(&self) -> Option<&FormatTemplate> {
        self.format.as_ref()
    }

    /// Semantic kind selecting the converter.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Resolves the column title: the explicit title, else the alias of the
    /// member name, else the member name itself.
    pub fn effective_title<'a>(&'a self, aliases: &'a HashMap<String, String>) -> &'a str {
        self.title
            .as_deref()
            .or_else(|| aliases.get(self.member).map(String::as_str))
            .unwrap_or(self.member)
    }

    /// Reads the member from a record.
    pub fn read(&self, record: &T) -> FieldValue {
        (self.read)(record)
    }

    /// Assigns a converted value to the member of a record.
    pub fn write(&self, record: &mut T, value: FieldValue) {
        (self.write)(record, value)
    }
}

impl<T> std::fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("member", &self.member)
            .field("title", &self.title)
            .field("required", &self.required)
            .field("format", &self.format.as_ref().map(FormatTemplate::as_str))
            .field("kind", &self.kind)
            .finish()
    }
}

/// Ordered list of the mapped members of a record type.
#[derive(Debug)]
pub struct Schema<T> {
    fields: Vec<FieldDescriptor<T>>,
}

impl<T: 'static> Schema<T> {
    /// Starts declaring a schema.
    pub fn builder() -> SchemaBuilder<T> {
        SchemaBuilder { fields: Vec::new() }
    }

    /// Mapped members in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor<T>] {
        &self.fields
    }

    /// Column titles of all members in declaration order.
    pub fn titles(&self, aliases: &HashMap<String, String>) -> Vec<String> {
        self.fields
            .iter()
            .map(|field| field.effective_title(aliases).to_owned())
            .collect()
    }
}

/// Builder of a [`Schema`].
pub struct SchemaBuilder<T> {
    fields: Vec<FieldDescriptor<T>>,
}

impl<T: 'static> SchemaBuilder<T> {
    /// Declares a member through its accessors. The member type decides the
    /// converter kind unless overridden with [`FieldBuilder::kind`].
    pub fn field<V>(self, member: &'static str, get: fn(&T) -> &V, get_mut: fn(&mut T) -> &mut V) -> FieldBuilder<T>
    where
        V: FieldType + 'static,
    {
        FieldBuilder {
            schema: self,
            field: FieldDescriptor {
                member,
                title: None,
                required: false,
                format: None,
                kind: V::kind(),
                read: Box::new(move |record| get(record).to_field()),
                write: Box::new(move |record, value| *get_mut(record) = V::from_field(value)),
            },
        }
    }

    /// Finishes the schema.
    pub fn build(self) -> Schema<T> {
        Schema { fields: self.fields }
    }
}

/// Builder of the most recently declared member of a schema.
pub struct FieldBuilder<T> {
    schema: SchemaBuilder<T>,
    field: FieldDescriptor<T>,
}

impl<T: 'static> FieldBuilder<T> {
    /// Binds the member to an explicit column title.
    pub fn title(mut self, title: &str) -> Self {
        self.field.title = Some(title.to_owned());
        self
    }

    /// Marks the member as required.
    pub fn required(mut self) -> Self {
        self.field.required = true;
        self
    }

    /// Renders the member through an output template on save.
    pub fn format(mut self, template: &str) -> Self {
        self.field.format = Some(FormatTemplate::new(template));
        self
    }

    /// Overrides the converter kind, e.g. for a [`FieldKind::Custom`] converter.
    pub fn kind(mut self, kind: FieldKind) -> Self {
        self.field.kind = kind;
        self
    }

    /// Declares the next member.
    pub fn field<V>(self, member: &'static str, get: fn(&T) -> &V, get_mut: fn(&mut T) -> &mut V) -> FieldBuilder<T>
    where
        V: FieldType + 'static,
    {
        self.finish().field(member, get, get_mut)
    }

    /// Finishes the schema.
    pub fn build(self) -> Schema<T> {
        self.finish().build()
    }

    fn finish(self) -> SchemaBuilder<T> {
        let mut schema = self.schema;
        schema.fields.push(self.field);
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Contact {
        name: String,
        phone: Option<String>,
        visits: i32,
    }

    fn schema() -> Schema<Contact> {
        Schema::builder()
            .field("name", |c: &Contact| &c.name, |c: &mut Contact| &mut c.name)
            .title("Full name")
            .required()
            .field("phone", |c: &Contact| &c.phone, |c: &mut Contact| &mut c.phone)
            .field("visits", |c: &Contact| &c.visits, |c: &mut Contact| &mut c.visits)
            .format("{0} times")
            .build()
    }

    #[test]
    fn schema_declaration_order() {
        let schema = schema();
        let members: Vec<&str> = schema.fields().iter().map(FieldDescriptor::member).collect();
        assert_eq!(members, vec!["name", "phone", "visits"]);
        assert!(schema.fields()[0].is_required());
        assert!(!schema.fields()[1].is_required());
        assert_eq!(schema.fields()[1].kind(), FieldKind::Text);
        assert_eq!(schema.fields()[2].kind(), FieldKind::Integer);
        assert_eq!(schema.fields()[2].format().map(FormatTemplate::as_str), Some("{0} times"));
    }

    #[test]
    fn effective_titles() {
        let schema = schema();
        let mut aliases = HashMap::new();
        aliases.insert("phone".to_owned(), "Phone number".to_owned());
        aliases.insert("name".to_owned(), "Ignored".to_owned());
        assert_eq!(schema.titles(&aliases), vec!["Full name", "Phone number", "visits"]);
        assert_eq!(schema.titles(&HashMap::new()), vec!["Full name", "phone", "visits"]);
    }

    #[test]
    fn accessors_move_values() {
        let schema = schema();
        let mut contact = Contact::default();
        schema.fields()[0].write(&mut contact, FieldValue::Text("Ada".to_owned()));
        schema.fields()[1].write(&mut contact, FieldValue::Null);
        schema.fields()[2].write(&mut contact, FieldValue::Integer(3));
        assert_eq!(contact.name, "Ada");
        assert_eq!(contact.phone, None);
        assert_eq!(contact.visits, 3);
        assert_eq!(schema.fields()[2].read(&contact), FieldValue::Integer(3));
    }
}
