#[derive(PartialEq, Debug)]
pub enum Stmt<'a> {
    Domain(Domain<'a>),
    Problem(Problem<'a>),
}

#[derive(PartialEq, Debug)]
pub struct Domain<'a> {
    pub name: &'a str,
    pub requirements: Vec<Requirement>,
    pub types: Vec<TypedList<'a>>,
    pub predicates: Vec<Predicate<'a>>,
    pub actions: Vec<Action<'a>>,
}

#[derive(PartialEq, Debug)]
pub struct Problem<'a> {
    pub name: &'a str,
    pub domain: &'a str,
    pub objects: Vec<TypedList<'a>>,
    pub init: Vec<Expr<'a>>,
    pub goal: Expr<'a>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Requirement {
    Strips,
    Typing,
    NegativePreconditions,
}

#[derive(PartialEq, Debug)]
pub enum Expr<'a> {
    And(Vec<Expr<'a>>),
    Not(Box<Expr<'a>>),
    Atom(Atom<'a>),
}

#[derive(PartialEq, Debug)]
pub struct Atom<'a> {
    pub name: &'a str,
    pub terms: Vec<Term<'a>>,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Term<'a> {
    Variable(&'a str),
    Name(&'a str),
}

#[derive(PartialEq, Debug)]
pub struct Action<'a> {
    pub name: &'a str,
    pub parameters: Vec<TypedList<'a>>,
    pub precondition: Option<Expr<'a>>,
    pub effect: Option<Expr<'a>>,
}

#[derive(PartialEq, Debug)]
pub struct Predicate<'a> {
    pub name: &'a str,
    pub variables: Vec<TypedList<'a>>,
}

impl Predicate<'_> {
    pub fn arity(&self) -> usize {
        self.variables.iter().map(|list| list.identifiers.len()).sum()
    }
}

/// `a b c - kind`. Lists written without a kind belong to `object`.
#[derive(PartialEq, Debug)]
pub struct TypedList<'a> {
    pub identifiers: Vec<&'a str>,
    pub kind: &'a str,
}
