use lumen_elab::*;
use lumen_tests::*;
use pretty_assertions::assert_eq;

#[test]
fn peel_then_reassemble_is_the_identity() {
    let mut elab = new_elab();
    let t = forall_nat_eq(&mut elab);

    let rebuilt = elab
        .forall_telescope(t, |elab, fvars, body| {
            assert_eq!(fvars.len(), 2);
            // no dangling indices: the body mentions the fresh locals
            let nat = c(elab, "Nat");
            let eq = c(elab, "Eq");
            let want = apps(elab, eq, &[nat, fvars[0], fvars[1]]);
            assert_eq!(body, want);
            elab.mk_forall_fvars(fvars, body)
        })
        .unwrap();
    // binder names are preserved, so re-abstraction reproduces the very node
    assert_eq!(rebuilt, t);
    // the ambient context is restored on exit
    assert!(elab.lctx.is_empty());
}

#[test]
fn bounded_telescope_stops_at_the_limit() {
    let mut elab = new_elab();
    let t = forall_nat_eq(&mut elab);

    elab.forall_bounded_telescope(t, Some(1), |elab, fvars, body| {
        assert_eq!(fvars.len(), 1);
        // the remaining binder chain is intact, with the peeled variable
        // substituted into it
        let nat = c(elab, "Nat");
        let eq = c(elab, "Eq");
        let b0 = elab.terms.mk_bound(0);
        let inner = apps(elab, eq, &[nat, fvars[0], b0]);
        let want = binder(elab, "b", nat, inner);
        assert_eq!(body, want);
        Ok(())
    })
    .unwrap();
}

#[test]
fn reducing_telescope_peels_through_reducible_synonyms() {
    let mut elab = new_elab();
    let rel = c(&mut elab, "Rel");

    // the literal constant has no syntactic binders
    elab.forall_telescope(rel, |_elab, fvars, _body| {
        assert_eq!(fvars.len(), 0);
        Ok(())
    })
    .unwrap();

    // the reducing walk unfolds the synonym and peels both binders
    elab.forall_telescope_reducing(rel, |elab, fvars, body| {
        assert_eq!(fvars.len(), 2);
        assert_eq!(body, elab.terms.mk_prop());
        Ok(())
    })
    .unwrap();
}

#[test]
fn class_binders_extend_the_local_instance_table() {
    let mut elab = new_elab();
    let dec = c(&mut elab, "Decidable");
    let nat = c(&mut elab, "Nat");
    let t = elab.terms.mk_forall(Binder {
        name: Name::new("inst"),
        kind: BinderKind::InstImplicit,
        ty: dec,
        body: nat,
    });

    assert!(elab.local_instances.is_empty());
    elab.forall_telescope(t, |elab, fvars, _body| {
        assert_eq!(elab.local_instances.len(), 1);
        let instance = &elab.local_instances[0];
        assert_eq!(instance.class_name, Name::new("Decidable"));
        assert_eq!(instance.fvar, fvar_id(elab, fvars[0]));
        Ok(())
    })
    .unwrap();
    // the extension is popped with the scope
    assert!(elab.local_instances.is_empty());
}

#[test]
fn lambda_let_telescope_carries_let_values() {
    let mut elab = new_elab();
    let nat = c(&mut elab, "Nat");
    let add = c(&mut elab, "add");
    let b0 = elab.terms.mk_bound(0);
    let b1 = elab.terms.mk_bound(1);
    let let_body = apps(&mut elab, add, &[b1, b0]);
    let let_node = elab.terms.mk_let(LetBinder {
        name: Name::new("y"),
        ty: nat,
        value: b0,
        body: let_body,
    });
    let lam = lambda(&mut elab, "x", nat, let_node);

    // the lambda-only walk stops at the let
    elab.lambda_telescope(lam, |elab, fvars, body| {
        assert_eq!(fvars.len(), 1);
        assert!(matches!(elab.terms.expr(body), Expr::Let(_)));
        Ok(())
    })
    .unwrap();

    elab.lambda_let_telescope(lam, |elab, fvars, body| {
        assert_eq!(fvars.len(), 2);
        let y = elab.get_local_decl(fvar_id(elab, fvars[1]))?;
        assert_eq!(y.value, Some(fvars[0]));
        let add = c(elab, "add");
        let want = apps(elab, add, &[fvars[0], fvars[1]]);
        assert_eq!(body, want);
        Ok(())
    })
    .unwrap();
}

#[test]
fn forall_meta_telescope_mints_dependently_typed_mvars() {
    let mut elab = new_elab();
    // forall (A : Sort 1) (a : A), A
    let type1 = elab.terms.mk_type();
    let b0 = elab.terms.mk_bound(0);
    let b1 = elab.terms.mk_bound(1);
    let inner = binder(&mut elab, "a", b0, b1);
    let t = binder(&mut elab, "A", type1, inner);

    let (mvars, kinds, body) = elab.forall_meta_telescope(t).unwrap();
    assert_eq!(mvars.len(), 2);
    assert_eq!(kinds, vec![BinderKind::Default, BinderKind::Default]);
    // the second metavariable's type is the first metavariable
    let second = elab.get_mvar_decl(mvar_id(&elab, mvars[1])).unwrap();
    assert_eq!(second.ty, mvars[0]);
    assert_eq!(body, mvars[0]);
}

#[test]
fn forall_meta_telescope_records_instance_implicit_binders() {
    let mut elab = new_elab();
    let dec = c(&mut elab, "Decidable");
    let nat = c(&mut elab, "Nat");
    let t = elab.terms.mk_forall(Binder {
        name: Name::new("inst"),
        kind: BinderKind::InstImplicit,
        ty: dec,
        body: nat,
    });

    let (mvars, kinds, body) = elab.forall_meta_telescope(t).unwrap();
    assert_eq!(mvars.len(), 1);
    // the caller learns which results typeclass search must solve
    assert_eq!(kinds, vec![BinderKind::InstImplicit]);
    assert_eq!(body, nat);
}

#[test]
fn bounded_meta_telescope_respects_the_limit() {
    let mut elab = new_elab();
    let t = forall_nat_eq(&mut elab);
    let (mvars, _kinds, body) = elab.forall_meta_bounded_telescope(t, 1).unwrap();
    assert_eq!(mvars.len(), 1);
    assert!(matches!(elab.terms.expr(body), Expr::Forall(_)));
}

#[test]
fn lambda_meta_telescope_builds_an_application_skeleton() {
    let mut elab = new_elab();
    let nat = c(&mut elab, "Nat");
    let add = c(&mut elab, "add");
    let b0 = elab.terms.mk_bound(0);
    let b1 = elab.terms.mk_bound(1);
    let body = apps(&mut elab, add, &[b1, b0]);
    let inner = lambda(&mut elab, "y", nat, body);
    let lam = lambda(&mut elab, "x", nat, inner);

    let (mvars, _kinds, peeled) = elab.lambda_meta_telescope(lam, None).unwrap();
    assert_eq!(mvars.len(), 2);
    let add = c(&mut elab, "add");
    let want = apps(&mut elab, add, &[mvars[0], mvars[1]]);
    assert_eq!(peeled, want);
}

#[test]
fn locals_are_found_by_user_name_inside_the_scope() {
    let mut elab = new_elab();
    let t = forall_nat_eq(&mut elab);
    elab.forall_telescope(t, |elab, fvars, _body| {
        let a = elab.get_local_decl_from_user_name(&Name::new("a"))?;
        assert_eq!(a.fvar, fvar_id(elab, fvars[0]));
        let err = elab.get_local_decl_from_user_name(&Name::new("zz")).unwrap_err();
        assert!(matches!(err.error, ElabError::UnknownUserName(_)));
        Ok(())
    })
    .unwrap();
}

#[test]
fn with_mvar_context_reenters_the_declaration_scope() {
    let mut elab = new_elab();
    let t = forall_nat_eq(&mut elab);
    let m_id = elab
        .forall_telescope(t, |elab, _fvars, body| {
            let m = elab.mk_fresh_expr_mvar(body, MetaKind::Synthetic, None);
            Ok(mvar_id(elab, m))
        })
        .unwrap();

    // the ambient context was popped with the telescope
    assert!(elab.lctx.is_empty());
    elab.with_mvar_context(m_id, |elab| {
        assert_eq!(elab.lctx.len(), 2);
        assert!(elab.get_local_decl_from_user_name(&Name::new("b")).is_ok());
    })
    .unwrap();
    assert!(elab.lctx.is_empty());
}

#[test]
fn telescope_restores_contexts_when_the_continuation_fails() {
    let mut elab = new_elab();
    let t = forall_nat_eq(&mut elab);
    let res: Result<()> = elab.forall_telescope(t, |elab, _fvars, _body| {
        assert_eq!(elab.lctx.len(), 2);
        elab.get_const_info(&Name::new("ghost"))?;
        Ok(())
    });
    assert!(matches!(res.unwrap_err().error, ElabError::UnknownConst(_)));
    assert!(elab.lctx.is_empty());
    assert!(elab.local_instances.is_empty());
}
