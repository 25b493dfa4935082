//! Shared scaffolding for the integration tests: a default engine with a
//! small constant table covering naturals, propositional equality, a few
//! reducible definitions, and a registered class.

use lumen_elab::*;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A fresh engine over the test prelude.
pub fn new_elab() -> Elaborator {
    init_logging();
    let mut elab = Elaborator::new(Environment::new(), Config::default());
    install_prelude(&mut elab);
    elab
}

/// Registers, via the rollback-capable `set_env` path:
///
/// - `Nat : Sort 1` with literals `zero`, `one`, `five : Nat`
/// - `add : Nat -> Nat -> Nat` (opaque)
/// - `Eq : forall (A : Sort 1) (a b : A), Sort 0` (opaque)
/// - `id : forall (A : Sort 1), A -> A := fun A a => a` (regular)
/// - `double : Nat -> Nat := fun n => add n n` (regular)
/// - `Rel : Sort 1 := forall (a b : Nat), Sort 0` (reducible synonym)
/// - `omega : Nat := omega` (a deliberately non-terminating unfolding)
/// - `Decidable : Sort 1` (class), `DecAlias := Decidable` (reducible)
/// - `Container : forall (A : Sort 1), Sort 1` (class)
pub fn install_prelude(elab: &mut Elaborator) {
    let mut env = elab.env.clone();

    let type1 = elab.terms.mk_type();
    let prop = elab.terms.mk_prop();
    let nat = elab.terms.mk_const("Nat", vec![]);

    let axiom = |name: &str, ty: ExprId| ConstantInfo {
        name: Name::new(name),
        level_params: vec![],
        ty,
        value: None,
        reducibility: Reducibility::Regular,
    };

    env.add_const(axiom("Nat", type1));
    env.add_const(axiom("zero", nat));
    env.add_const(axiom("one", nat));
    env.add_const(axiom("five", nat));

    // add : Nat -> Nat -> Nat
    let nat_to_nat = arrow(elab, nat, nat);
    let add_ty = arrow(elab, nat, nat_to_nat);
    env.add_const(axiom("add", add_ty));

    // Eq : forall (A : Sort 1) (a b : A), Sort 0
    let b0 = elab.terms.mk_bound(0);
    let b1 = elab.terms.mk_bound(1);
    let eq_b = binder(elab, "b", b1, prop);
    let eq_a = binder(elab, "a", b0, eq_b);
    let eq_ty = binder_of(elab, "A", type1, eq_a);
    env.add_const(axiom("Eq", eq_ty));

    // id : forall (A : Sort 1), A -> A := fun A a => a
    let id_inner = binder(elab, "a", b0, b1);
    let id_ty = binder_of(elab, "A", type1, id_inner);
    let id_body = lambda(elab, "a", b0, b0);
    let id_value = lambda(elab, "A", type1, id_body);
    env.add_const(ConstantInfo {
        name: Name::new("id"),
        level_params: vec![],
        ty: id_ty,
        value: Some(id_value),
        reducibility: Reducibility::Regular,
    });

    // double : Nat -> Nat := fun n => add n n
    let add_c = elab.terms.mk_const("add", vec![]);
    let add_nn = elab.terms.mk_apps(add_c, &[b0, b0]);
    let double_value = lambda(elab, "n", nat, add_nn);
    env.add_const(ConstantInfo {
        name: Name::new("double"),
        level_params: vec![],
        ty: nat_to_nat,
        value: Some(double_value),
        reducibility: Reducibility::Regular,
    });

    // Rel : Sort 1 := forall (a b : Nat), Sort 0
    let rel_b = binder(elab, "b", nat, prop);
    let rel_value = binder(elab, "a", nat, rel_b);
    env.add_const(ConstantInfo {
        name: Name::new("Rel"),
        level_params: vec![],
        ty: type1,
        value: Some(rel_value),
        reducibility: Reducibility::Reducible,
    });

    // omega : Nat := omega
    let omega_c = elab.terms.mk_const("omega", vec![]);
    env.add_const(ConstantInfo {
        name: Name::new("omega"),
        level_params: vec![],
        ty: nat,
        value: Some(omega_c),
        reducibility: Reducibility::Regular,
    });

    env.add_const(axiom("Decidable", type1));
    env.register_class("Decidable");
    let dec = elab.terms.mk_const("Decidable", vec![]);
    env.add_const(ConstantInfo {
        name: Name::new("DecAlias"),
        level_params: vec![],
        ty: type1,
        value: Some(dec),
        reducibility: Reducibility::Reducible,
    });

    // Container : forall (A : Sort 1), Sort 1
    let container_ty = binder_of(elab, "A", type1, type1);
    env.add_const(axiom("Container", container_ty));
    env.register_class("Container");

    // P : forall (n : Nat), Sort 1, a dependent type former
    let p_ty = binder(elab, "n", nat, type1);
    env.add_const(axiom("P", p_ty));

    elab.set_env(env);
}

/* ------------------------------ Term builders ------------------------------ */

pub fn c(elab: &mut Elaborator, name: &str) -> ExprId {
    elab.terms.mk_const(name, vec![])
}

pub fn apps(elab: &mut Elaborator, f: ExprId, args: &[ExprId]) -> ExprId {
    elab.terms.mk_apps(f, args)
}

/// Non-dependent `dom -> cod` as an anonymous default binder.
pub fn arrow(elab: &mut Elaborator, dom: ExprId, cod: ExprId) -> ExprId {
    elab.terms.mk_forall(Binder {
        name: Name::anonymous(),
        kind: BinderKind::Default,
        ty: dom,
        body: cod,
    })
}

pub fn binder(elab: &mut Elaborator, name: &str, ty: ExprId, body: ExprId) -> ExprId {
    elab.terms.mk_forall(Binder {
        name: Name::new(name),
        kind: BinderKind::Default,
        ty,
        body,
    })
}

/// Like [`binder`], reads better for type-former domains.
pub fn binder_of(elab: &mut Elaborator, name: &str, ty: ExprId, body: ExprId) -> ExprId {
    binder(elab, name, ty, body)
}

pub fn lambda(elab: &mut Elaborator, name: &str, ty: ExprId, body: ExprId) -> ExprId {
    elab.terms.mk_lambda(Binder {
        name: Name::new(name),
        kind: BinderKind::Default,
        ty,
        body,
    })
}

/// The running example from the telescope scenarios:
/// `forall (a : Nat) (b : Nat), Eq Nat a b`.
pub fn forall_nat_eq(elab: &mut Elaborator) -> ExprId {
    let nat = c(elab, "Nat");
    let eq = c(elab, "Eq");
    let b0 = elab.terms.mk_bound(0);
    let b1 = elab.terms.mk_bound(1);
    let body = apps(elab, eq, &[nat, b1, b0]);
    let inner = binder(elab, "b", nat, body);
    binder(elab, "a", nat, inner)
}

/* ------------------------------- Id extractors ----------------------------- */

pub fn mvar_id(elab: &Elaborator, e: ExprId) -> MVarId {
    match elab.terms.expr(e) {
        | Expr::Meta(m) => *m,
        | other => panic!("expected a metavariable node, got {:?}", other),
    }
}

pub fn fvar_id(elab: &Elaborator, e: ExprId) -> FVarId {
    match elab.terms.expr(e) {
        | Expr::Local(f) => *f,
        | other => panic!("expected a local node, got {:?}", other),
    }
}

pub fn lmvar_id(elab: &Elaborator, l: LevelId) -> LMVarId {
    match elab.terms.level(l) {
        | Level::Meta(m) => *m,
        | other => panic!("expected a level metavariable, got {:?}", other),
    }
}
