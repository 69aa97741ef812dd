mod jwt_extract;
